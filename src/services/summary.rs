//! Per-metric aggregate statistics for `/summary`.

use std::collections::BTreeMap;

use diesel::prelude::*;
use log::warn;

use crate::error::ApiError;
use crate::models::api::{MetricSummary, QualityDistribution};
use crate::models::quality::QualityLevel;
use crate::services::filters::{metric_catalog, DataFilters};

/// Computes summary statistics for every metric with at least one matching
/// observation. Metrics whose filtered set is empty are omitted from the map
/// entirely.
pub fn summarize(
    conn: &mut SqliteConnection,
    filters: &DataFilters,
) -> Result<BTreeMap<String, MetricSummary>, ApiError> {
    let mut summaries = BTreeMap::new();

    for metric in metric_catalog(conn, filters)? {
        let rows = filters.load_value_quality(conn, metric.id)?;

        let samples: Vec<(f64, QualityLevel)> = rows
            .into_iter()
            .filter_map(|(value, quality)| match quality.parse::<QualityLevel>() {
                Ok(level) => Some((value, level)),
                Err(_) => {
                    warn!(
                        "Metric {} has observation with unrecognized quality {:?}; skipping",
                        metric.name, quality
                    );
                    None
                }
            })
            .collect();
        if samples.is_empty() {
            continue;
        }

        let aggregate = aggregate(&samples);
        summaries.insert(
            metric.name,
            MetricSummary {
                min: aggregate.min,
                max: aggregate.max,
                avg: aggregate.avg,
                weighted_avg: aggregate.weighted_avg,
                unit: metric.unit,
                quality_distribution: aggregate.distribution,
            },
        );
    }

    Ok(summaries)
}

struct Aggregate {
    min: f64,
    max: f64,
    avg: f64,
    weighted_avg: f64,
    distribution: QualityDistribution,
}

/// Min/max/mean, quality-weighted mean and exact-level quality distribution
/// over a non-empty sample.
fn aggregate(samples: &[(f64, QualityLevel)]) -> Aggregate {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut counts = [0usize; 4];

    for &(value, quality) in samples {
        min = min.min(value);
        max = max.max(value);
        sum += value;
        weighted_sum += value * quality.weight();
        weight_total += quality.weight();
        counts[quality.ordinal()] += 1;
    }

    let n = samples.len() as f64;
    Aggregate {
        min,
        max,
        avg: sum / n,
        weighted_avg: weighted_sum / weight_total,
        distribution: QualityDistribution {
            excellent: counts[QualityLevel::Excellent.ordinal()] as f64 / n,
            good: counts[QualityLevel::Good.ordinal()] as f64 / n,
            questionable: counts[QualityLevel::Questionable.ordinal()] as f64 / n,
            poor: counts[QualityLevel::Poor.ordinal()] as f64 / n,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPSILON: f64 = 1e-9;

    fn mixed_sample() -> Vec<(f64, QualityLevel)> {
        vec![
            (10.0, QualityLevel::Poor),
            (20.0, QualityLevel::Questionable),
            (30.0, QualityLevel::Good),
            (40.0, QualityLevel::Excellent),
        ]
    }

    #[test]
    fn plain_statistics() {
        let agg = aggregate(&mixed_sample());
        assert_eq!(agg.min, 10.0);
        assert_eq!(agg.max, 40.0);
        assert_eq!(agg.avg, 25.0);
    }

    #[test]
    fn weighted_average_uses_fixed_quality_weights() {
        let agg = aggregate(&mixed_sample());
        // (10*0.3 + 20*0.5 + 30*0.8 + 40*1.0) / (0.3 + 0.5 + 0.8 + 1.0)
        let expected = 77.0 / 2.6;
        assert!((agg.weighted_avg - expected).abs() < EPSILON);
    }

    #[test]
    fn weighted_average_stays_within_value_range() {
        let skewed = vec![
            (-5.0, QualityLevel::Poor),
            (-5.0, QualityLevel::Poor),
            (12.5, QualityLevel::Excellent),
        ];
        for samples in [mixed_sample(), skewed] {
            let agg = aggregate(&samples);
            assert!(agg.min <= agg.weighted_avg && agg.weighted_avg <= agg.max);
        }
    }

    #[test]
    fn distribution_fractions_sum_to_one() {
        let agg = aggregate(&mixed_sample());
        let d = agg.distribution;
        let total = d.excellent + d.good + d.questionable + d.poor;
        assert!((total - 1.0).abs() < EPSILON);
        assert_eq!(d.excellent, 0.25);
        assert_eq!(d.poor, 0.25);
    }

    #[test]
    fn absent_levels_report_zero() {
        let agg = aggregate(&[(1.0, QualityLevel::Good), (3.0, QualityLevel::Good)]);
        let d = agg.distribution;
        assert_eq!(d.good, 1.0);
        assert_eq!(d.excellent, 0.0);
        assert_eq!(d.questionable, 0.0);
        assert_eq!(d.poor, 0.0);
    }

    #[test]
    fn single_sample_is_its_own_summary() {
        let agg = aggregate(&[(7.25, QualityLevel::Questionable)]);
        assert_eq!(agg.min, 7.25);
        assert_eq!(agg.max, 7.25);
        assert_eq!(agg.avg, 7.25);
        assert!((agg.weighted_avg - 7.25).abs() < EPSILON);
    }
}
