use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::warehouses::{CreateWarehouseInput, UpdateWarehouseInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn create_warehouse(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateWarehouseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.warehouses.create_warehouse(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.warehouses.get_warehouse(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_warehouses(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouses = state.services.warehouses.list_warehouses().await?;
    Ok(Json(ApiResponse::success(warehouses)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateWarehouseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .warehouses
        .update_warehouse(id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.warehouses.delete_warehouse(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_warehouse_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let stock = state.services.warehouses.warehouse_stock(id).await?;
    Ok(Json(ApiResponse::success(stock)))
}
