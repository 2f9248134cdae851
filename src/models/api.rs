//! API request and response types.
//!
//! These are the JSON shapes served to visualization front-ends. They are
//! separate from the database row types so the wire contract can evolve
//! independently of storage.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::quality::QualityLevel;

/// Query parameters for `GET /api/v1/climate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClimateQueryParams {
    pub location_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metric: Option<String>,
    pub quality_threshold: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters shared by `GET /api/v1/summary` and
/// `GET /api/v1/trends`. `location_id` is optional at the wire level; the
/// trends handler enforces its presence.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisQueryParams {
    pub location_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metric: Option<String>,
    pub quality_threshold: Option<String>,
}

/// One observation row as returned by `/climate`, denormalized with its
/// location and metric attributes.
#[derive(Debug, Clone, Serialize)]
pub struct ApiObservation {
    pub id: i32,
    pub location_id: i32,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    pub metric: String,
    pub value: f64,
    pub unit: String,
    pub quality: QualityLevel,
}

/// Pagination metadata accompanying `/climate` responses. `total_count` is
/// the size of the filtered set before paging.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub total_count: i64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Serialize)]
pub struct ObservationsBody {
    pub data: Vec<ApiObservation>,
    pub meta: PageMeta,
}

/// Generic `{"data": ...}` envelope used by the non-paginated endpoints.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// Per-metric aggregate statistics served by `/summary`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub weighted_avg: f64,
    pub unit: String,
    pub quality_distribution: QualityDistribution,
}

/// Fraction of observations at each exact quality level. The four fields sum
/// to 1.0 for any non-empty sample.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QualityDistribution {
    pub excellent: f64,
    pub good: f64,
    pub questionable: f64,
    pub poor: f64,
}

/// Categorical trend label derived from a regression slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Per-metric trend analysis served by `/trends`.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub trend: TrendStats,
    pub anomalies: Vec<Anomaly>,
    pub seasonality: Seasonality,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendStats {
    pub direction: TrendDirection,
    /// Normalized rate of change in `unit` per month, rounded to 2 decimals.
    pub rate: f64,
    pub unit: String,
    pub confidence: f64,
}

/// An observation deviating from the series mean by more than two standard
/// deviations.
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub value: f64,
    /// Distance from the mean in standard deviations.
    pub deviation: f64,
    pub quality: QualityLevel,
}

/// Seasonal profile of a series. `period` and `pattern` are only present
/// when a profile was computed.
#[derive(Debug, Clone, Serialize)]
pub struct Seasonality {
    pub detected: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<BTreeMap<Season, SeasonPattern>>,
}

/// Calendar seasons used for bucketing (Northern-hemisphere convention,
/// not location-aware).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Maps a calendar month (1-12) to its season: Mar-May spring, Jun-Aug
    /// summer, Sep-Nov fall, Dec-Feb winter.
    #[must_use]
    pub const fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeasonPattern {
    pub avg: f64,
    pub trend: TrendDirection,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_boundaries() {
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Fall);
        assert_eq!(Season::from_month(11), Season::Fall);
        assert_eq!(Season::from_month(12), Season::Winter);
    }

    #[test]
    fn seasonality_omits_absent_fields() {
        let none = Seasonality {
            detected: false,
            confidence: 0.0,
            period: None,
            pattern: None,
        };
        let body = serde_json::to_value(&none).expect("serializable");
        assert_eq!(body, serde_json::json!({"detected": false, "confidence": 0.0}));
    }
}
