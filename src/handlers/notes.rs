use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::notes::{CreateNoteInput, MoveNoteInput, UpdateNoteInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateNoteInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .notes
        .create_note(input, Some(user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let found = state.services.notes.get_note(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn get_board(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let board = state.services.notes.board().await?;
    Ok(Json(ApiResponse::success(board)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<UpdateNoteInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.notes.update_note(id, input).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn move_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
    Json(input): Json<MoveNoteInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let moved = state.services.notes.move_note(id, input).await?;
    Ok(Json(ApiResponse::success(moved)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.notes.delete_note(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
