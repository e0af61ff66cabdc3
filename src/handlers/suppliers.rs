use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::suppliers::{CreateSupplierInput, UpdateSupplierInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn create_supplier(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateSupplierInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.suppliers.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.suppliers.get_supplier(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.suppliers.list_suppliers().await?;
    Ok(Json(ApiResponse::success(suppliers)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateSupplierInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.suppliers.update_supplier(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_supplier_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.suppliers.supplier_items(id).await?;
    Ok(Json(ApiResponse::success(items)))
}
