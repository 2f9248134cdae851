//! Seed payload types.
//!
//! The payload is a single JSON document with `locations`, `metrics` and
//! `climate_data` arrays, loaded once at startup when the store is empty.
//! Reference rows carry explicit ids so observations can point at them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{Location, Metric};
use crate::models::quality::QualityLevel;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub climate_data: Vec<SeedObservation>,
}

/// One observation in the seed payload. Quality is validated during
/// deserialization; a payload with an unknown quality name fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedObservation {
    pub location_id: i32,
    pub metric_id: i32,
    pub date: NaiveDate,
    pub value: f64,
    pub quality: QualityLevel,
}
