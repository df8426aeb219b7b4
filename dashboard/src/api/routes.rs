use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use std::sync::Arc;

use super::models::{ApiResponse, OverviewParams};
use crate::models::{CountrySeries, GlobalTotals, OverviewRow};
use crate::services::{AppError, DashboardService};
use crate::services::dashboard::StatusReport;

const DEFAULT_OVERVIEW_LIMIT: usize = 10;

pub async fn overview(
    Query(params): Query<OverviewParams>,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<Vec<OverviewRow>>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_OVERVIEW_LIMIT);
    let rows = service.overview(limit).await.map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn global_totals(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<GlobalTotals>>, AppError> {
    let totals = service.global_totals().await.map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(totals)))
}

pub async fn country_overview(
    Path(country): Path<String>,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<OverviewRow>>, AppError> {
    let row = service
        .country_overview(&country)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn country_series(
    Path(country): Path<String>,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<CountrySeries>>, AppError> {
    let series = service
        .country_series(&country)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(series)))
}

pub async fn status(
    State(service): State<Arc<DashboardService>>,
) -> Json<ApiResponse<StatusReport>> {
    Json(ApiResponse::success(service.status()))
}

// Define all API routes
pub fn routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/overview", get(overview))
        .route("/api/global", get(global_totals))
        .route("/api/countries/{country}/overview", get(country_overview))
        .route("/api/countries/{country}/series", get(country_series))
        .route("/api/status", get(status))
        .with_state(service)
}
