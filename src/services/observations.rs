//! Paginated observation listing for `/climate`.

use std::collections::BTreeMap;

use diesel::prelude::*;
use log::warn;

use crate::db::models::{ClimateData, Location, Metric};
use crate::error::ApiError;
use crate::models::api::ApiObservation;
use crate::models::quality::QualityLevel;
use crate::schema::{locations, metrics};
use crate::services::filters::DataFilters;

pub struct ObservationPage {
    pub rows: Vec<ApiObservation>,
    /// Size of the filtered set before paging.
    pub total_count: i64,
}

/// Counts the filtered set, then loads one date-ascending page of it and
/// denormalizes each row with its location and metric attributes.
pub fn list(
    conn: &mut SqliteConnection,
    filters: &DataFilters,
    page: u32,
    per_page: u32,
) -> Result<ObservationPage, ApiError> {
    let total_count = filters.count_observations(conn)?;

    let offset = i64::from(page.max(1) - 1) * i64::from(per_page);
    let rows: Vec<ClimateData> =
        filters.load_observation_page(conn, offset, i64::from(per_page))?;

    let location_index: BTreeMap<i32, Location> = locations::table
        .load::<Location>(conn)?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();
    let metric_index: BTreeMap<i32, Metric> = metrics::table
        .load::<Metric>(conn)?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let rows = rows
        .into_iter()
        .filter_map(|row| {
            let Some(location) = location_index.get(&row.location_id) else {
                warn!(
                    "Observation {} references unknown location {}; skipping",
                    row.id, row.location_id
                );
                return None;
            };
            let Some(metric) = metric_index.get(&row.metric_id) else {
                warn!(
                    "Observation {} references unknown metric {}; skipping",
                    row.id, row.metric_id
                );
                return None;
            };
            let Ok(quality) = row.quality.parse::<QualityLevel>() else {
                warn!(
                    "Observation {} has unrecognized quality {:?}; skipping",
                    row.id, row.quality
                );
                return None;
            };
            Some(ApiObservation {
                id: row.id,
                location_id: row.location_id,
                location_name: location.name.clone(),
                latitude: location.latitude,
                longitude: location.longitude,
                date: row.date,
                metric: metric.name.clone(),
                value: row.value,
                unit: metric.unit.clone(),
                quality,
            })
        })
        .collect();

    Ok(ObservationPage { rows, total_count })
}
