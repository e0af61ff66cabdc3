use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::bid_types::{
    AddStatusInput, CreateBidTypeInput, TransitionInput, UpdateBidTypeInput, UpdateStatusInput,
};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderRequest {
    /// Complete ordering of the type's status keys
    pub keys: Vec<String>,
}

pub async fn create_bid_type(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateBidTypeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.bid_types.create_bid_type(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_bid_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.bid_types.get_bid_type(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_bid_types(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let types = state.services.bid_types.list_bid_types().await?;
    Ok(Json(ApiResponse::success(types)))
}

pub async fn update_bid_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateBidTypeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bid_types.update_bid_type(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_bid_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.bid_types.delete_bid_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.bid_types.workflow_view(id).await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn add_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<AddStatusInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bid_types.add_status(id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(updated))))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path((id, key)): Path<(Uuid, String)>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateStatusInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .bid_types
        .update_status(id, &key, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn remove_status(
    State(state): State<AppState>,
    Path((id, key)): Path<(Uuid, String)>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bid_types.remove_status(id, &key).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn reorder_statuses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .bid_types
        .reorder_statuses(id, req.keys)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn add_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<TransitionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.bid_types.add_transition(id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(updated))))
}

pub async fn remove_transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<TransitionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .bid_types
        .remove_transition(id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
