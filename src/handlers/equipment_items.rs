use super::common::PaginationParams;
use crate::auth::AuthenticatedUser;
use crate::entities::equipment_item::ItemStatus;
use crate::errors::ServiceError;
use crate::services::equipment_items::{
    AssignItemInput, ItemListQuery, ReceiveItemInput, UpdateItemInput,
};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ItemFilterParams {
    pub equipment_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<ItemStatus>,
    pub imei: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReleaseItemRequest {
    pub warehouse_id: Uuid,
}

pub async fn receive_item(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<ReceiveItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.equipment_items.receive_item(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.equipment_items.get_item(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ItemFilterParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .equipment_items
        .list_items(ItemListQuery {
            equipment_id: filter.equipment_id,
            warehouse_id: filter.warehouse_id,
            supplier_id: filter.supplier_id,
            client_id: filter.client_id,
            status: filter.status,
            imei: filter.imei,
            limit: Some(pagination.limit()),
            offset: Some(pagination.offset()),
        })
        .await?;
    Ok(Json(ApiResponse::success(
        pagination.paginate(result.items, result.total),
    )))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .equipment_items
        .update_item(id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.equipment_items.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<AssignItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .equipment_items
        .assign_item(id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn install_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.equipment_items.install_item(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn release_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(req): Json<ReleaseItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .equipment_items
        .release_item(id, req.warehouse_id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn write_off_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.equipment_items.write_off_item(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}
