use super::common::PaginationParams;
use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::equipment::{CreateEquipmentInput, EquipmentListQuery, UpdateEquipmentInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct EquipmentFilterParams {
    pub search: Option<String>,
    pub active: Option<bool>,
}

pub async fn create_equipment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateEquipmentInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.equipment.create_equipment(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.equipment.get_equipment(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_equipment(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<EquipmentFilterParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .equipment
        .list_equipment(EquipmentListQuery {
            search: filter.search,
            active: filter.active,
            limit: Some(pagination.limit()),
            offset: Some(pagination.offset()),
        })
        .await?;
    Ok(Json(ApiResponse::success(
        pagination.paginate(result.equipment, result.total),
    )))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateEquipmentInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.equipment.update_equipment(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.equipment.delete_equipment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
