use super::common::PaginationParams;
use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::bids::{BidListQuery, CreateBidInput, UpdateBidInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct BidFilterParams {
    pub bid_type_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignBidRequest {
    pub assignee_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateBidStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BoardParams {
    pub bid_type_id: Uuid,
}

pub async fn create_bid(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateBidInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.bids.create_bid(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.bids.get_bid(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn get_bid_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.bids.get_bid_by_number(&number).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_bids(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<BidFilterParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .bids
        .list_bids(BidListQuery {
            bid_type_id: filter.bid_type_id,
            client_id: filter.client_id,
            status: filter.status,
            assignee_id: filter.assignee_id,
            scheduled_from: filter.scheduled_from,
            scheduled_to: filter.scheduled_to,
            limit: Some(pagination.limit()),
            offset: Some(pagination.offset()),
        })
        .await?;
    Ok(Json(ApiResponse::success(
        pagination.paginate(result.bids, result.total),
    )))
}

pub async fn update_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateBidInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bids.update_bid(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn assign_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(req): Json<AssignBidRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bids.assign_bid(id, req.assignee_id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn update_bid_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(req): Json<UpdateBidStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .bids
        .update_bid_status(id, &req.status)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn get_bid_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.bids.bid_equipment(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let board = state.services.bids.board(params.bid_type_id).await?;
    Ok(Json(ApiResponse::success(board)))
}

pub async fn delete_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.bids.delete_bid(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
