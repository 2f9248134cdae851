//! Synthetic seed payload generation.
//!
//! Produces a deterministic sample payload (fixed city list, seasonal sine
//! components plus seeded noise, weighted quality mix) so a fresh checkout
//! can create a seed file without real observation data. Invoked via
//! `--generate-sample`; writes JSON and never touches the database.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::db::models::{Location, Metric};
use crate::models::quality::QualityLevel;
use crate::models::seed::{SeedData, SeedObservation};

const RNG_SEED: u64 = 0x00c1_17a7_e5ee_d001;
const SAMPLE_YEARS: i64 = 2;
const STEP_DAYS: i64 = 5;

const CITIES: [(&str, &str, f64, f64, Option<&str>); 6] = [
    ("Reykjavik", "Iceland", 64.1466, -21.9426, None),
    ("Lisbon", "Portugal", 38.7223, -9.1393, Some("Lisboa")),
    ("Nairobi", "Kenya", -1.2921, 36.8219, Some("Nairobi County")),
    ("Sydney", "Australia", -33.8688, 151.2093, Some("New South Wales")),
    ("Vancouver", "Canada", 49.2827, -123.1207, Some("British Columbia")),
    ("Singapore", "Singapore", 1.3521, 103.8198, None),
];

const METRICS: [(&str, &str, &str, &str); 3] = [
    (
        "temperature",
        "Average Temperature",
        "celsius",
        "Daily mean air temperature at 2 m",
    ),
    (
        "precipitation",
        "Precipitation",
        "mm",
        "Accumulated precipitation over the observation interval",
    ),
    (
        "humidity",
        "Relative Humidity",
        "percent",
        "Daily mean relative humidity",
    ),
];

/// Generates the sample payload and writes it to `path` as pretty-printed
/// JSON.
pub fn write_sample(path: &Path) -> Result<(), String> {
    let payload = generate();
    let body = serde_json::to_string_pretty(&payload)
        .map_err(|e| format!("failed to encode sample payload: {}", e))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
        }
    }
    fs::write(path, body).map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
    info!(
        "Sample payload written to {} ({} locations, {} metrics, {} observations)",
        path.display(),
        payload.locations.len(),
        payload.metrics.len(),
        payload.climate_data.len()
    );
    Ok(())
}

/// Builds the payload itself: every city gets a time series per metric,
/// stepped every [`STEP_DAYS`] days across [`SAMPLE_YEARS`] years.
pub fn generate() -> SeedData {
    let mut rng = SmallRng::seed_from_u64(RNG_SEED);

    let locations: Vec<Location> = CITIES
        .iter()
        .enumerate()
        .map(|(index, (name, country, latitude, longitude, region))| Location {
            id: index as i32 + 1,
            name: (*name).to_string(),
            country: (*country).to_string(),
            latitude: *latitude,
            longitude: *longitude,
            region: region.map(str::to_string),
        })
        .collect();

    let metrics: Vec<Metric> = METRICS
        .iter()
        .enumerate()
        .map(|(index, (name, display_name, unit, description))| Metric {
            id: index as i32 + 1,
            name: (*name).to_string(),
            display_name: (*display_name).to_string(),
            unit: (*unit).to_string(),
            description: (*description).to_string(),
        })
        .collect();

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date");
    let end = start + Duration::days(365 * SAMPLE_YEARS);

    let mut climate_data = Vec::new();
    for location in &locations {
        let mut date = start;
        while date < end {
            let annual_fraction = f64::from(date.ordinal0()) / 365.0;
            for metric in &metrics {
                let value = match metric.name.as_str() {
                    "temperature" => compute_temperature(location.latitude, annual_fraction, &mut rng),
                    "precipitation" => compute_precipitation(annual_fraction, &mut rng),
                    _ => compute_humidity(annual_fraction, &mut rng),
                };
                climate_data.push(SeedObservation {
                    location_id: location.id,
                    metric_id: metric.id,
                    date,
                    value: (value * 10.0).round() / 10.0,
                    quality: pick_quality(&mut rng),
                });
            }
            date = date + Duration::days(STEP_DAYS);
        }
    }

    SeedData {
        locations,
        metrics,
        climate_data,
    }
}

fn compute_temperature(latitude: f64, annual_fraction: f64, rng: &mut SmallRng) -> f64 {
    // Warmer near the equator; the seasonal swing flips sign with the
    // hemisphere.
    let base = 28.0 - latitude.abs() * 0.45;
    let seasonal_amplitude = 3.0 + latitude.abs() * 0.15;
    let phase = ((annual_fraction - 0.55) * 2.0 * PI).cos() * latitude.signum();
    let noise = rng.random_range(-2.5..=2.5);
    (base + seasonal_amplitude * phase + noise).clamp(-35.0, 45.0)
}

fn compute_precipitation(annual_fraction: f64, rng: &mut SmallRng) -> f64 {
    let seasonal = ((annual_fraction + 0.25) * 2.0 * PI).sin() * 20.0;
    let shower = if rng.random_bool(0.15) {
        rng.random_range(10.0..=40.0)
    } else {
        0.0
    };
    let noise = rng.random_range(-8.0..=8.0);
    (35.0 + seasonal + shower + noise).max(0.0)
}

fn compute_humidity(annual_fraction: f64, rng: &mut SmallRng) -> f64 {
    let seasonal = ((annual_fraction + 0.1) * 2.0 * PI).cos() * 8.0;
    let noise = rng.random_range(-6.0..=6.0);
    (62.0 + seasonal + noise).clamp(20.0, 100.0)
}

fn pick_quality(rng: &mut SmallRng) -> QualityLevel {
    let roll: f64 = rng.random_range(0.0..1.0);
    if roll < 0.45 {
        QualityLevel::Excellent
    } else if roll < 0.75 {
        QualityLevel::Good
    } else if roll < 0.90 {
        QualityLevel::Questionable
    } else {
        QualityLevel::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn payload_is_internally_consistent() {
        let payload = generate();
        assert_eq!(payload.locations.len(), CITIES.len());
        assert_eq!(payload.metrics.len(), METRICS.len());
        assert!(!payload.climate_data.is_empty());

        let location_ids: BTreeSet<i32> = payload.locations.iter().map(|l| l.id).collect();
        let metric_ids: BTreeSet<i32> = payload.metrics.iter().map(|m| m.id).collect();
        for obs in &payload.climate_data {
            assert!(location_ids.contains(&obs.location_id));
            assert!(metric_ids.contains(&obs.metric_id));
            assert!(obs.value.is_finite());
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let first = serde_json::to_string(&generate()).expect("payload encodes");
        let second = serde_json::to_string(&generate()).expect("payload encodes");
        assert_eq!(first, second);
    }

    #[test]
    fn written_file_parses_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sample_data.json");
        write_sample(&path).expect("sample written");

        let raw = std::fs::read_to_string(&path).expect("file readable");
        let parsed: crate::models::seed::SeedData =
            serde_json::from_str(&raw).expect("payload parses");
        assert_eq!(parsed.locations.len(), CITIES.len());
    }
}
