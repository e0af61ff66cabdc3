use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::services::tokens::CreateTokenInput;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn create_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateTokenInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let minted = state
        .services
        .tokens
        .create_token(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(minted))))
}

pub async fn list_tokens(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let tokens = state.services.tokens.list_tokens().await?;
    Ok(Json(ApiResponse::success(tokens)))
}

pub async fn revoke_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let revoked = state.services.tokens.revoke_token(id).await?;
    Ok(Json(ApiResponse::success(revoked)))
}
