use crate::{
    auth::{api_token, AuthService},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Service for API token management. Minting and hashing live in
/// [`AuthService`]; this wraps them with listing and revocation.
#[derive(Clone)]
pub struct TokenService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    event_sender: EventSender,
    logger: Logger,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateTokenInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Returned once, on creation; the plaintext is never recoverable later.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MintedToken {
    pub token: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub record: api_token::Model,
}

impl TokenService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        event_sender: EventSender,
        logger: Logger,
    ) -> Self {
        Self {
            db,
            auth,
            event_sender,
            logger,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_token(
        &self,
        owner: Uuid,
        input: CreateTokenInput,
    ) -> Result<MintedToken, ServiceError> {
        input.validate()?;

        if let Some(expires_at) = input.expires_at {
            if expires_at <= Utc::now() {
                return Err(ServiceError::ValidationError(
                    "expires_at must be in the future".into(),
                ));
            }
        }

        let (token, record) = self
            .auth
            .mint_api_token(&input.name, owner, input.permissions, input.expires_at)
            .await
            .map_err(|e| match e {
                crate::auth::AuthError::UnknownPermission(p) => {
                    ServiceError::ValidationError(format!("unknown permission '{}'", p))
                }
                crate::auth::AuthError::Database(e) => ServiceError::DatabaseError(e),
                other => ServiceError::InternalError(other.to_string()),
            })?;

        slog::info!(self.logger, "api token minted";
            "token_id" => %record.id, "name" => &record.name);
        self.event_sender
            .send(Event::ApiTokenCreated(record.id))
            .await;

        Ok(MintedToken { token, record })
    }

    /// All tokens, newest first. Hashes are never serialized.
    #[instrument(skip(self))]
    pub async fn list_tokens(&self) -> Result<Vec<api_token::Model>, ServiceError> {
        Ok(api_token::Entity::find()
            .order_by_desc(api_token::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Revoke a token. Idempotent.
    #[instrument(skip(self))]
    pub async fn revoke_token(&self, id: Uuid) -> Result<api_token::Model, ServiceError> {
        let existing = api_token::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("API token {} not found", id)))?;

        if existing.revoked {
            return Ok(existing);
        }

        let mut model: api_token::ActiveModel = existing.into();
        model.revoked = Set(true);
        let updated = model.update(&*self.db).await?;

        slog::info!(self.logger, "api token revoked"; "token_id" => %id);
        self.event_sender.send(Event::ApiTokenRevoked(id)).await;
        Ok(updated)
    }
}
