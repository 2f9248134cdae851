//! One-shot startup seeding.
//!
//! The store is populated from a static JSON payload exactly once: if any
//! location rows exist the step is a no-op. There is no other write path in
//! the service.

use std::fs;
use std::path::Path;

use diesel::prelude::*;
use log::info;

use crate::db::models::NewClimateData;
use crate::error::SeedError;
use crate::models::seed::SeedData;
use crate::schema::{climate_data, locations, metrics};

/// Rows per insert statement, kept well under SQLite's bind-parameter limit.
const INSERT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub locations: usize,
    pub metrics: usize,
    pub observations: usize,
}

/// Seeds the store from the payload at `path` if it is currently empty.
/// Returns `Ok(None)` when data already exists and nothing was done.
pub fn seed_if_empty(
    conn: &mut SqliteConnection,
    path: &Path,
) -> Result<Option<SeedReport>, SeedError> {
    let existing: i64 = locations::table.count().get_result(conn)?;
    if existing > 0 {
        return Ok(None);
    }

    info!("Loading seed payload from {}", path.display());
    let payload = read_payload(path)?;
    let report = insert_payload(conn, &payload)?;
    info!(
        "Store seeded ({} location(s), {} metric(s), {} observation(s))",
        report.locations, report.metrics, report.observations
    );
    Ok(Some(report))
}

fn read_payload(path: &Path) -> Result<SeedData, SeedError> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let payload = serde_path_to_error::deserialize(&mut deserializer)?;
    Ok(payload)
}

fn insert_payload(conn: &mut SqliteConnection, payload: &SeedData) -> Result<SeedReport, SeedError> {
    diesel::insert_into(locations::table)
        .values(&payload.locations)
        .execute(conn)?;
    diesel::insert_into(metrics::table)
        .values(&payload.metrics)
        .execute(conn)?;

    let rows: Vec<NewClimateData> = payload
        .climate_data
        .iter()
        .map(|obs| NewClimateData {
            location_id: obs.location_id,
            metric_id: obs.metric_id,
            date: obs.date,
            value: obs.value,
            quality: obs.quality.as_str().to_string(),
        })
        .collect();
    for chunk in rows.chunks(INSERT_BATCH_SIZE) {
        diesel::insert_into(climate_data::table)
            .values(chunk)
            .execute(conn)?;
    }

    Ok(SeedReport {
        locations: payload.locations.len(),
        metrics: payload.metrics.len(),
        observations: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Location, Metric};
    use crate::models::quality::QualityLevel;
    use crate::models::seed::SeedObservation;
    use crate::run_migrations;
    use chrono::NaiveDate;
    use std::io::Write;

    fn empty_store() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").expect("in-memory store");
        run_migrations(&mut conn).expect("migrations apply");
        conn
    }

    fn payload_file(payload: &SeedData) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let body = serde_json::to_string(payload).expect("payload encodes");
        file.write_all(body.as_bytes()).expect("payload written");
        file
    }

    fn small_payload() -> SeedData {
        SeedData {
            locations: vec![Location {
                id: 1,
                name: "Reykjavik".to_string(),
                country: "Iceland".to_string(),
                latitude: 64.1466,
                longitude: -21.9426,
                region: None,
            }],
            metrics: vec![Metric {
                id: 1,
                name: "temperature".to_string(),
                display_name: "Average Temperature".to_string(),
                unit: "celsius".to_string(),
                description: "Daily mean air temperature".to_string(),
            }],
            climate_data: vec![SeedObservation {
                location_id: 1,
                metric_id: 1,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
                value: -2.5,
                quality: QualityLevel::Excellent,
            }],
        }
    }

    #[test]
    fn seeds_an_empty_store() {
        let mut conn = empty_store();
        let file = payload_file(&small_payload());

        let report = seed_if_empty(&mut conn, file.path())
            .expect("seeding succeeds")
            .expect("store was empty");
        assert_eq!(report.locations, 1);
        assert_eq!(report.metrics, 1);
        assert_eq!(report.observations, 1);

        let total: i64 = climate_data::table.count().get_result(&mut conn).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut conn = empty_store();
        let file = payload_file(&small_payload());

        seed_if_empty(&mut conn, file.path()).expect("first run").expect("seeded");
        let second = seed_if_empty(&mut conn, file.path()).expect("second run");
        assert!(second.is_none());

        let total: i64 = locations::table.count().get_result(&mut conn).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn malformed_payload_reports_the_json_path() {
        let mut conn = empty_store();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{"locations": [{"id": "not-a-number"}]}"#)
            .expect("payload written");

        let err = seed_if_empty(&mut conn, file.path()).expect_err("payload is invalid");
        assert!(matches!(err, SeedError::Parse(_)));
        assert!(err.to_string().contains("locations"));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let mut conn = empty_store();
        let err = seed_if_empty(&mut conn, Path::new("/nonexistent/seed.json"))
            .expect_err("file is missing");
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
