//! Trend, anomaly and seasonality analysis for `/trends`.
//!
//! The analysis runs independently per metric over the filtered,
//! date-ascending series at one location. Metrics with fewer than
//! [`MIN_TREND_POINTS`] observations are omitted from the result; anomaly
//! detection and the seasonal profile additionally need
//! [`MIN_PATTERN_POINTS`].

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;
use log::warn;

use crate::error::ApiError;
use crate::models::api::{
    Anomaly, Season, SeasonPattern, Seasonality, TrendDirection, TrendReport, TrendStats,
};
use crate::models::quality::QualityLevel;
use crate::services::filters::{metric_catalog, DataFilters};

/// Below this many observations no trend is reported at all.
const MIN_TREND_POINTS: usize = 3;
/// Below this many observations anomalies stay empty and no seasonal profile
/// is attempted.
const MIN_PATTERN_POINTS: usize = 5;
/// Slopes with magnitude under this count as flat.
const FLAT_SLOPE_THRESHOLD: f64 = 0.01;
/// An observation is anomalous beyond this many standard deviations.
const ANOMALY_SIGMA: f64 = 2.0;
/// Month length used to normalize the rate of change.
const DAYS_PER_MONTH: f64 = 30.0;

struct SeriesPoint {
    date: NaiveDate,
    value: f64,
    quality: QualityLevel,
}

/// Analyzes every metric with enough observations at the filtered location.
/// The location filter is mandatory and must already be set on `filters`.
pub fn analyze(
    conn: &mut SqliteConnection,
    filters: &DataFilters,
) -> Result<BTreeMap<String, TrendReport>, ApiError> {
    let mut reports = BTreeMap::new();

    for metric in metric_catalog(conn, filters)? {
        let rows = filters.load_date_series(conn, metric.id)?;

        let series: Vec<SeriesPoint> = rows
            .into_iter()
            .filter_map(|(date, value, quality)| match quality.parse::<QualityLevel>() {
                Ok(level) => Some(SeriesPoint {
                    date,
                    value,
                    quality: level,
                }),
                Err(_) => {
                    warn!(
                        "Metric {} has observation with unrecognized quality {:?}; skipping",
                        metric.name, quality
                    );
                    None
                }
            })
            .collect();
        if series.len() < MIN_TREND_POINTS {
            continue;
        }

        reports.insert(metric.name, analyze_series(&series, &metric.unit));
    }

    Ok(reports)
}

fn analyze_series(series: &[SeriesPoint], unit: &str) -> TrendReport {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let slope = linear_slope(&values);

    let first = series[0].date;
    let last = series[series.len() - 1].date;
    let rate = rate_of_change(slope, values.len(), first, last);

    TrendReport {
        trend: TrendStats {
            direction: direction_for(slope),
            rate: round2(rate),
            unit: format!("{unit}/month"),
            confidence: round2(confidence_for(values.len())),
        },
        anomalies: detect_anomalies(series),
        seasonality: seasonal_profile(series, slope),
    }
}

/// Slope of an ordinary-least-squares degree-1 fit of the values against
/// their index 0..n-1.
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        covariance += dx * (y - y_mean);
        variance += dx * dx;
    }
    if variance == 0.0 {
        return 0.0;
    }
    covariance / variance
}

/// Trend label with a dead zone: slopes under [`FLAT_SLOPE_THRESHOLD`] in
/// magnitude are stable.
fn direction_for(slope: f64) -> TrendDirection {
    if slope.abs() < FLAT_SLOPE_THRESHOLD {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

/// Trend label by sign alone; only an exactly-zero slope is stable. Used for
/// the per-season labels.
fn sign_direction(slope: f64) -> TrendDirection {
    if slope > 0.0 {
        TrendDirection::Increasing
    } else if slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Sample-count heuristic, not a statistical measure: grows linearly from
/// 0.5, capped at 0.95.
fn confidence_for(n: usize) -> f64 {
    (0.5 + 0.5 * n as f64 / 10.0).min(0.95)
}

/// Observations more than [`ANOMALY_SIGMA`] sample standard deviations from
/// the series mean. A degenerate series (all values identical) reports no
/// anomalies rather than failing.
fn detect_anomalies(series: &[SeriesPoint]) -> Vec<Anomaly> {
    if series.len() < MIN_PATTERN_POINTS {
        return Vec::new();
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let std_dev = sample_std_dev(&values, mean);
    if std_dev == 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    series
        .iter()
        .filter(|p| (p.value - mean).abs() > ANOMALY_SIGMA * std_dev)
        .map(|p| Anomaly {
            date: p.date,
            value: p.value,
            deviation: (p.value - mean).abs() / std_dev,
            quality: p.quality,
        })
        .collect()
}

/// Sample standard deviation (n-1 divisor).
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Buckets the series by calendar season and reports each bucket's average.
/// With enough points the profile is always reported as a detected yearly
/// pattern at fixed confidence (a placeholder heuristic, not a seasonality
/// test). The per-season trend label comes from the series-wide slope.
fn seasonal_profile(series: &[SeriesPoint], slope: f64) -> Seasonality {
    if series.len() < MIN_PATTERN_POINTS {
        return Seasonality {
            detected: false,
            confidence: 0.0,
            period: None,
            pattern: None,
        };
    }

    let mut buckets: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for point in series {
        buckets
            .entry(Season::from_month(point.date.month()))
            .or_default()
            .push(point.value);
    }

    let label = sign_direction(slope);
    let pattern = buckets
        .into_iter()
        .map(|(season, values)| {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            (season, SeasonPattern { avg, trend: label })
        })
        .collect();

    Seasonality {
        detected: true,
        confidence: 0.7,
        period: Some("yearly".to_string()),
        pattern: Some(pattern),
    }
}

/// Normalizes the per-index slope into units per month across the observed
/// span. A span of zero days reports a rate of zero.
fn rate_of_change(slope: f64, n: usize, first: NaiveDate, last: NaiveDate) -> f64 {
    let span_months = (last - first).num_days() as f64 / DAYS_PER_MONTH;
    if span_months > 0.0 {
        slope * (n as f64 / span_months)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPSILON: f64 = 1e-9;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn monthly_series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: ymd(2024, i as u32 + 1, 15),
                value,
                quality: QualityLevel::Good,
            })
            .collect()
    }

    #[test]
    fn slope_of_linear_series_is_exact() {
        assert!((linear_slope(&[1.0, 2.0, 3.0]) - 1.0).abs() < EPSILON);
        assert!((linear_slope(&[10.0, 8.0, 6.0, 4.0]) + 2.0).abs() < EPSILON);
        assert!(linear_slope(&[5.0, 5.0, 5.0]).abs() < EPSILON);
    }

    #[test]
    fn direction_has_a_dead_zone() {
        assert_eq!(direction_for(0.009), TrendDirection::Stable);
        assert_eq!(direction_for(-0.0099), TrendDirection::Stable);
        assert_eq!(direction_for(0.011), TrendDirection::Increasing);
        assert_eq!(direction_for(-0.02), TrendDirection::Decreasing);
    }

    #[test]
    fn season_label_is_stable_only_at_exactly_zero() {
        assert_eq!(sign_direction(0.0), TrendDirection::Stable);
        assert_eq!(sign_direction(0.0001), TrendDirection::Increasing);
        assert_eq!(sign_direction(-0.0001), TrendDirection::Decreasing);
    }

    #[test]
    fn confidence_grows_with_samples_and_caps() {
        let mut previous = 0.0;
        for n in 1..30 {
            let c = confidence_for(n);
            assert!(c >= previous, "confidence must be non-decreasing");
            assert!(c <= 0.95);
            previous = c;
        }
        assert!((confidence_for(5) - 0.75).abs() < EPSILON);
        assert!((confidence_for(9) - 0.95).abs() < EPSILON);
        assert!((confidence_for(100) - 0.95).abs() < EPSILON);
    }

    #[test]
    fn outlier_is_flagged_with_its_deviation() {
        let series = monthly_series(&[10.0, 12.0, 11.0, 13.0, 50.0, 12.0, 11.0]);
        let anomalies = detect_anomalies(&series);
        assert_eq!(anomalies.len(), 1);
        let anomaly = &anomalies[0];
        assert_eq!(anomaly.date, ymd(2024, 5, 15));
        assert_eq!(anomaly.value, 50.0);
        assert!(anomaly.deviation > 2.0);
        assert_eq!(anomaly.quality, QualityLevel::Good);
    }

    #[test]
    fn small_series_report_no_anomalies() {
        let series = monthly_series(&[1.0, 100.0, 1.0, 100.0]);
        assert!(detect_anomalies(&series).is_empty());
    }

    #[test]
    fn constant_series_reports_no_anomalies() {
        let series = monthly_series(&[3.0; 8]);
        assert!(detect_anomalies(&series).is_empty());
    }

    #[test]
    fn seasonal_profile_needs_enough_points() {
        let sparse = monthly_series(&[1.0, 2.0, 3.0, 4.0]);
        let profile = seasonal_profile(&sparse, 1.0);
        assert!(!profile.detected);
        assert_eq!(profile.confidence, 0.0);
        assert!(profile.period.is_none());
        assert!(profile.pattern.is_none());
    }

    #[test]
    fn seasonal_profile_buckets_by_calendar_season() {
        // Jan..Jul on the 15th: winter {Jan, Feb}, spring {Mar, Apr, May},
        // summer {Jun, Jul}.
        let series = monthly_series(&[10.0, 12.0, 11.0, 13.0, 50.0, 12.0, 11.0]);
        let profile = seasonal_profile(&series, 1.5);
        assert!(profile.detected);
        assert_eq!(profile.confidence, 0.7);
        assert_eq!(profile.period.as_deref(), Some("yearly"));

        let pattern = profile.pattern.expect("pattern present");
        assert_eq!(pattern.len(), 3);
        assert!((pattern[&Season::Winter].avg - 11.0).abs() < EPSILON);
        assert!((pattern[&Season::Spring].avg - 74.0 / 3.0).abs() < EPSILON);
        assert!((pattern[&Season::Summer].avg - 11.5).abs() < EPSILON);
        for stats in pattern.values() {
            assert_eq!(stats.trend, TrendDirection::Increasing);
        }
    }

    #[test]
    fn rate_normalizes_slope_to_months() {
        // 5 points across 121 days: rate = slope * (n / (121 / 30)).
        let rate = rate_of_change(10.0, 5, ymd(2024, 1, 10), ymd(2024, 5, 10));
        assert!((rate - 10.0 * (5.0 / (121.0 / 30.0))).abs() < EPSILON);
    }

    #[test]
    fn zero_time_span_reports_zero_rate() {
        let day = ymd(2024, 6, 1);
        assert_eq!(rate_of_change(3.0, 4, day, day), 0.0);
    }

    #[test]
    fn report_combines_the_pieces() {
        let series = monthly_series(&[10.0, 12.0, 11.0, 13.0, 50.0, 12.0, 11.0]);
        let report = analyze_series(&series, "celsius");
        assert_eq!(report.trend.direction, TrendDirection::Increasing);
        assert_eq!(report.trend.unit, "celsius/month");
        // n=7: 0.5 + 0.5 * 7/10.
        assert_eq!(report.trend.confidence, 0.85);
        // slope 1.5 over 182 days: 1.5 * (7 / (182/30)) rounded to 2 decimals.
        assert_eq!(report.trend.rate, 1.73);
        assert_eq!(report.anomalies.len(), 1);
        assert!(report.seasonality.detected);
    }

    #[test]
    fn rounding_is_to_two_decimals() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(-2.718), -2.72);
        assert_eq!(round2(2.0), 2.0);
    }
}
