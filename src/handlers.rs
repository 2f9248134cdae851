//! HTTP handler functions for the climate query API.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;

use crate::db::models::{Location, Metric};
use crate::error::ApiError;
use crate::models::api::{
    AnalysisQueryParams, ApiHealth, ClimateQueryParams, DataBody, ObservationsBody, PageMeta,
};
use crate::schema::{locations, metrics};
use crate::services::filters::DataFilters;
use crate::services::observations;
use crate::services::summary::summarize;
use crate::services::trends::analyze;
use crate::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 50;

/// `GET /api/v1/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/v1/climate`
///
/// Filtered, date-ascending observation rows with pagination metadata.
pub async fn climate(
    state: web::Data<AppState>,
    params: web::Query<ClimateQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let filters = DataFilters::from_params(
        params.location_id,
        params.start_date,
        params.end_date,
        params.metric,
        params.quality_threshold.as_deref(),
    )?;
    let page = params.page.unwrap_or(DEFAULT_PAGE).max(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);

    let mut conn = state.pool.acquire();
    let listing = observations::list(&mut conn, &filters, page, per_page)?;

    Ok(HttpResponse::Ok().json(ObservationsBody {
        data: listing.rows,
        meta: PageMeta {
            total_count: listing.total_count,
            page,
            per_page,
        },
    }))
}

/// `GET /api/v1/locations`
pub async fn list_locations(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut conn = state.pool.acquire();
    let rows: Vec<Location> = locations::table.order(locations::id.asc()).load(&mut *conn)?;
    Ok(HttpResponse::Ok().json(DataBody { data: rows }))
}

/// `GET /api/v1/metrics`
pub async fn list_metrics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut conn = state.pool.acquire();
    let rows: Vec<Metric> = metrics::table.order(metrics::id.asc()).load(&mut *conn)?;
    Ok(HttpResponse::Ok().json(DataBody { data: rows }))
}

/// `GET /api/v1/summary`
///
/// Aggregate statistics per metric over the filtered observation set.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<AnalysisQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let filters = DataFilters::from_params(
        params.location_id,
        params.start_date,
        params.end_date,
        params.metric,
        params.quality_threshold.as_deref(),
    )?;

    let mut conn = state.pool.acquire();
    let summaries = summarize(&mut conn, &filters)?;
    Ok(HttpResponse::Ok().json(DataBody { data: summaries }))
}

/// `GET /api/v1/trends`
///
/// Trend/anomaly/seasonality analysis per metric. Trend analysis is always
/// location-scoped, so `location_id` is required.
pub async fn trends(
    state: web::Data<AppState>,
    params: web::Query<AnalysisQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let Some(location_id) = params.location_id else {
        return Err(ApiError::InvalidParameter(
            "location_id is required for trend analysis".to_string(),
        ));
    };
    let filters = DataFilters::from_params(
        Some(location_id),
        params.start_date,
        params.end_date,
        params.metric,
        params.quality_threshold.as_deref(),
    )?;

    let mut conn = state.pool.acquire();
    let reports = analyze(&mut conn, &filters)?;
    Ok(HttpResponse::Ok().json(DataBody { data: reports }))
}
