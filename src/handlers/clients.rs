use super::common::PaginationParams;
use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::client_objects::CreateClientObjectInput;
use crate::services::clients::{ClientListQuery, CreateClientInput, UpdateClientInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ClientFilterParams {
    pub search: Option<String>,
    pub archived: Option<bool>,
}

pub async fn create_client(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateClientInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.clients.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.clients.get_client(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ClientFilterParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state
        .services
        .clients
        .list_clients(ClientListQuery {
            search: filter.search,
            archived: filter.archived,
            limit: Some(pagination.limit()),
            offset: Some(pagination.offset()),
        })
        .await?;
    Ok(Json(ApiResponse::success(
        pagination.paginate(result.clients, result.total),
    )))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateClientInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.clients.update_client(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn archive_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let archived = state.services.clients.archive_client(id).await?;
    Ok(Json(ApiResponse::success(archived)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.clients.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_client_bids(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let bids = state
        .services
        .clients
        .client_bids(id, Some(pagination.limit()), Some(pagination.offset()))
        .await?;
    Ok(Json(ApiResponse::success(bids)))
}

pub async fn get_client_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.clients.client_equipment(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn get_client_objects(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let objects = state.services.clients.client_objects(id).await?;
    Ok(Json(ApiResponse::success(objects)))
}

pub async fn create_client_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateClientObjectInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .client_objects
        .create_object(id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
