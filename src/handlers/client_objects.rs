use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::client_objects::UpdateClientObjectInput;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn get_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.client_objects.get_object(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn update_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateClientObjectInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .client_objects
        .update_object(id, input)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.client_objects.delete_object(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
