//! Diesel model structs for the seeded reference tables and the observation
//! time series.
//!
//! All three tables are written exactly once, during startup seeding; every
//! request path only ever reads them.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema;

/// A geographic site observations are recorded at.
///
/// Doubles as the seed-payload shape: locations arrive with explicit ids so
/// that observation rows can reference them.
#[derive(Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::locations)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub region: Option<String>,
}

/// A measured quantity (temperature, precipitation, ...) with its unit.
#[derive(Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::metrics)]
pub struct Metric {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub unit: String,
    pub description: String,
}

/// One dated observation of a metric at a location.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::climate_data)]
#[diesel(belongs_to(Location))]
#[diesel(belongs_to(Metric))]
pub struct ClimateData {
    pub id: i32,
    pub location_id: i32,
    pub metric_id: i32,
    pub date: NaiveDate,
    pub value: f64,
    pub quality: String,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::climate_data)]
pub struct NewClimateData {
    pub location_id: i32,
    pub metric_id: i32,
    pub date: NaiveDate,
    pub value: f64,
    pub quality: String,
}
