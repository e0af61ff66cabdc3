use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ByStatusParams {
    pub bid_type_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub days: Option<i64>,
}

pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let metrics = state.services.analytics.dashboard().await?;
    Ok(Json(ApiResponse::success(metrics)))
}

pub async fn get_bids_by_status(
    State(state): State<AppState>,
    Query(params): Query<ByStatusParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let counts = state
        .services
        .analytics
        .bids_by_status(params.bid_type_id)
        .await?;
    Ok(Json(ApiResponse::success(counts)))
}

pub async fn get_bids_created(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let series = state.services.analytics.bids_created(params.days).await?;
    Ok(Json(ApiResponse::success(series)))
}

pub async fn get_equipment_by_warehouse(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let counts = state.services.analytics.equipment_by_warehouse().await?;
    Ok(Json(ApiResponse::success(counts)))
}
