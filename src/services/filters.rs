//! Shared observation filtering.
//!
//! `/climate`, `/summary` and `/trends` accept the same optional filter
//! parameters. They are validated once into a [`DataFilters`] and applied as
//! AND-combined predicates over `climate_data`; absent filters impose no
//! constraint. The loaders below differ only in their select clause, so the
//! predicate application is shared through a small macro.

use chrono::NaiveDate;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::db::models::{ClimateData, Metric};
use crate::error::ApiError;
use crate::models::quality::QualityLevel;
use crate::schema::{climate_data, metrics};

#[derive(Debug, Clone, Default)]
pub struct DataFilters {
    pub location_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metric: Option<String>,
    pub quality_threshold: Option<QualityLevel>,
}

/// Applies the AND-combined filter predicates to a boxed `climate_data`
/// query, whatever its select clause. Date bounds are inclusive, the quality
/// filter keeps the threshold level and everything above it, and the metric
/// filter matches by name through a subquery (an unknown name matches
/// nothing).
macro_rules! apply_filters {
    ($base:expr, $filters:expr) => {{
        let mut query = $base;
        if let Some(id) = $filters.location_id {
            query = query.filter(climate_data::location_id.eq(id));
        }
        if let Some(start) = $filters.start_date {
            query = query.filter(climate_data::date.ge(start));
        }
        if let Some(end) = $filters.end_date {
            query = query.filter(climate_data::date.le(end));
        }
        if let Some(name) = &$filters.metric {
            let matching = metrics::table
                .filter(metrics::name.eq(name.clone()))
                .select(metrics::id);
            query = query.filter(climate_data::metric_id.eq_any(matching));
        }
        if let Some(threshold) = $filters.quality_threshold {
            let accepted: Vec<&'static str> =
                threshold.at_or_above().iter().map(|q| q.as_str()).collect();
            query = query.filter(climate_data::quality.eq_any(accepted));
        }
        query
    }};
}

impl DataFilters {
    /// Validates raw request parameters. An unrecognized quality threshold is
    /// rejected here, before any query runs.
    pub fn from_params(
        location_id: Option<i32>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        metric: Option<String>,
        quality_threshold: Option<&str>,
    ) -> Result<Self, ApiError> {
        let quality_threshold = match quality_threshold {
            Some(raw) => Some(
                raw.parse::<QualityLevel>()
                    .map_err(|_| invalid_quality_threshold(raw))?,
            ),
            None => None,
        };

        Ok(Self {
            location_id,
            start_date,
            end_date,
            metric,
            quality_threshold,
        })
    }

    /// Size of the filtered observation set.
    pub fn count_observations(&self, conn: &mut SqliteConnection) -> Result<i64, ApiError> {
        let query = apply_filters!(
            climate_data::table.select(count_star()).into_boxed::<Sqlite>(),
            self
        );
        query.get_result(conn).map_err(ApiError::from)
    }

    /// One date-ascending page of the filtered observation set.
    pub fn load_observation_page(
        &self,
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ClimateData>, ApiError> {
        let query = apply_filters!(climate_data::table.into_boxed::<Sqlite>(), self);
        query
            .order(climate_data::date.asc())
            .offset(offset)
            .limit(limit)
            .load(conn)
            .map_err(ApiError::from)
    }

    /// `(value, quality)` pairs of the filtered set for one metric, in no
    /// particular order.
    pub fn load_value_quality(
        &self,
        conn: &mut SqliteConnection,
        metric_id: i32,
    ) -> Result<Vec<(f64, String)>, ApiError> {
        let query = apply_filters!(
            climate_data::table
                .select((climate_data::value, climate_data::quality))
                .into_boxed::<Sqlite>(),
            self
        );
        query
            .filter(climate_data::metric_id.eq(metric_id))
            .load(conn)
            .map_err(ApiError::from)
    }

    /// The filtered, date-ascending `(date, value, quality)` series for one
    /// metric.
    pub fn load_date_series(
        &self,
        conn: &mut SqliteConnection,
        metric_id: i32,
    ) -> Result<Vec<(NaiveDate, f64, String)>, ApiError> {
        let query = apply_filters!(
            climate_data::table
                .select((climate_data::date, climate_data::value, climate_data::quality))
                .into_boxed::<Sqlite>(),
            self
        );
        query
            .filter(climate_data::metric_id.eq(metric_id))
            .order(climate_data::date.asc())
            .load(conn)
            .map_err(ApiError::from)
    }
}

/// Metrics the analysis endpoints iterate over: all of them, or just the one
/// named by the `metric` filter.
pub fn metric_catalog(
    conn: &mut SqliteConnection,
    filters: &DataFilters,
) -> Result<Vec<Metric>, ApiError> {
    let mut query = metrics::table.into_boxed::<Sqlite>();
    if let Some(name) = &filters.metric {
        query = query.filter(metrics::name.eq(name.clone()));
    }
    query
        .order(metrics::id.asc())
        .load(conn)
        .map_err(ApiError::from)
}

fn invalid_quality_threshold(raw: &str) -> ApiError {
    let valid = QualityLevel::all()
        .iter()
        .map(|q| q.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    ApiError::InvalidParameter(format!(
        "Invalid quality threshold {raw:?}. Must be one of: {valid}"
    ))
}
