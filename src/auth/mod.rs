//! Authentication and authorization.
//!
//! Two principals exist: interactive users (JWT access/refresh pairs, argon2
//! password hashes) and external integrations (long-lived `sk_` API tokens,
//! stored as SHA-256 digests). Both resolve to an [`AuthUser`] carrying a
//! permission set; route groups opt in with
//! [`AuthRouterExt::with_permission`].

pub mod api_token;
pub mod permissions;
pub mod user;

pub use permissions::{consts, role_permissions};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub email: Option<String>,    // User's email
    pub role: Option<String>,     // User's role
    pub permissions: Vec<String>, // User's permissions
    pub jti: String,              // JWT ID
    pub iat: i64,                 // Issued at time
    pub exp: i64,                 // Expiration time
    pub nbf: i64,                 // Not valid before time
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
}

/// Authenticated principal extracted from a JWT or API token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
    pub is_api_token: bool,
}

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Alias used by handlers as an extractor
pub type AuthenticatedUser = AuthUser;

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
    pub api_token_prefix: String,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
        api_token_prefix: String,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer: "fleetcrm-auth".to_string(),
            jwt_audience: "fleetcrm-api".to_string(),
            access_token_expiration,
            refresh_token_expiration,
            api_token_prefix,
        }
    }
}

/// Authentication service that handles credentials, token issuance and
/// validation for both users and API tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

/// Length of the random token material after the prefix
const API_TOKEN_RANDOM_LEN: usize = 40;
/// Characters of the plaintext token kept for display
const API_TOKEN_DISPLAY_PREFIX_LEN: usize = 8;

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Hash a password with argon2id.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::InternalError(format!("stored hash invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Authenticate a user by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.is_active {
            return Err(AuthError::UserInactive);
        }
        if !self.verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.generate_token(&account)
    }

    /// Issue an access/refresh pair for a user.
    pub fn generate_token(&self, account: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let role = account
            .role()
            .map_err(|_| AuthError::InternalError(format!("unknown role '{}'", account.role)))?;
        let permissions = role_permissions(role);

        let access_claims = Claims {
            sub: account.id.to_string(),
            email: Some(account.email.clone()),
            role: Some(account.role.clone()),
            permissions: permissions.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Refresh tokens carry minimal data
        let refresh_claims = Claims {
            sub: account.id.to_string(),
            email: None,
            role: None,
            permissions: vec![],
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::new(Algorithm::HS256), &access_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        let refresh_token = encode(&Header::new(Algorithm::HS256), &refresh_claims, &key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Refresh an access token using a refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !account.is_active {
            return Err(AuthError::UserInactive);
        }

        self.generate_token(&account)
    }

    fn hash_api_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Mint a new API token. The plaintext is returned exactly once; only its
    /// digest is persisted.
    pub async fn mint_api_token(
        &self,
        name: &str,
        owner: Uuid,
        grants: Vec<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(String, api_token::Model), AuthError> {
        for grant in &grants {
            if !permissions::is_known_permission(grant) {
                return Err(AuthError::UnknownPermission(grant.clone()));
            }
        }

        let random: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(API_TOKEN_RANDOM_LEN)
            .map(char::from)
            .collect();
        let plaintext = format!("{}{}", self.config.api_token_prefix, random);

        let model = api_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            token_hash: Set(Self::hash_api_token(&plaintext)),
            prefix: Set(plaintext
                .chars()
                .take(API_TOKEN_DISPLAY_PREFIX_LEN)
                .collect()),
            user_id: Set(owner),
            permissions: Set(serde_json::json!(grants)),
            expires_at: Set(expires_at),
            last_used_at: Set(None),
            revoked: Set(false),
            created_at: Set(Utc::now()),
        };

        let stored = model.insert(&*self.db).await?;
        Ok((plaintext, stored))
    }

    /// Resolve an API token to a principal.
    pub async fn validate_api_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        if !token.starts_with(&self.config.api_token_prefix) {
            return Err(AuthError::InvalidApiToken);
        }

        let digest = Self::hash_api_token(token);
        let record = api_token::Entity::find()
            .filter(api_token::Column::TokenHash.eq(digest))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidApiToken)?;

        if record.revoked {
            return Err(AuthError::RevokedApiToken);
        }
        if let Some(expires_at) = record.expires_at {
            if expires_at < Utc::now() {
                return Err(AuthError::ExpiredApiToken);
            }
        }

        let grants: Vec<String> =
            serde_json::from_value(record.permissions.clone()).unwrap_or_default();

        // Best-effort usage stamp; a failure here must not fail the request
        let mut touch: api_token::ActiveModel = record.clone().into();
        touch.last_used_at = Set(Some(Utc::now()));
        if let Err(e) = touch.update(&*self.db).await {
            debug!("failed to stamp api token last_used_at: {}", e);
        }

        Ok(AuthUser {
            user_id: record.user_id,
            email: None,
            role: None,
            permissions: grants,
            token_id: record.id.to_string(),
            is_api_token: true,
        })
    }
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginCredentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Admin request to create a user account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[schema(value_type = String, example = "manager")]
    pub role: user::Role,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is inactive")]
    UserInactive,

    #[error("Invalid API token")]
    InvalidApiToken,

    #[error("API token expired")]
    ExpiredApiToken,

    #[error("API token revoked")]
    RevokedApiToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::InvalidCredentials
            | Self::UserInactive
            | Self::InvalidApiToken
            | Self::ExpiredApiToken
            | Self::RevokedApiToken => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::UnknownPermission(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TokenCreation(_) | Self::Database(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Database(_) | AuthError::InternalError(_) | AuthError::TokenCreation(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = crate::errors::ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            request_id: crate::middleware::request_id::current_request_id()
                .map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    // Admins have all permissions
    if principal.is_admin() {
        return Ok(next.run(request).await);
    }

    if !principal.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates credentials
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            warn!("authentication middleware reached without AuthService extension");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers.
///
/// `Authorization: Bearer <jwt>` and `Authorization: Bearer sk_…` share the
/// header; the API token prefix disambiguates. `X-API-Token` is also accepted.
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                let token = token.trim();
                if token.starts_with(&auth_service.config.api_token_prefix) {
                    return auth_service.validate_api_token(token).await;
                }

                let claims = auth_service.validate_token(token)?;
                let user_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
                return Ok(AuthUser {
                    user_id,
                    email: claims.email,
                    role: claims.role,
                    permissions: claims.permissions,
                    token_id: claims.jti,
                    is_api_token: false,
                });
            }
        }
    }

    if let Some(token_header) = headers.get("x-api-token") {
        if let Ok(token) = token_header.to_str() {
            return auth_service.validate_api_token(token.trim()).await;
        }
    }

    Err(AuthError::MissingAuth)
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    use axum::routing::{get, post};

    let protected = axum::Router::new()
        .route("/me", get(me_handler))
        .with_auth();
    let admin = axum::Router::new()
        .route("/users", post(create_user_handler))
        .with_permission(consts::USERS_MANAGE);

    axum::Router::new()
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_token_handler))
        .merge(protected)
        .merge(admin)
}

async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenPair>, AuthError> {
    credentials
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let pair = auth_service
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(pair))
}

async fn refresh_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(refresh_request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = auth_service
        .refresh_token(&refresh_request.refresh_token)
        .await?;
    Ok(Json(pair))
}

async fn me_handler(principal: AuthUser) -> Json<AuthUser> {
    Json(principal)
}

async fn create_user_handler(
    State(auth_service): State<Arc<AuthService>>,
    _principal: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<user::Model>), AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(req.email.trim().to_lowercase()),
        password_hash: Set(auth_service.hash_password(&req.password)?),
        full_name: Set(req.full_name),
        role: Set(req.role.to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    };

    let stored = account.insert(&*auth_service.db).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        let cfg = AuthConfig::new(
            "unit-test-secret-key-that-is-long-enough".into(),
            Duration::from_secs(3600),
            Duration::from_secs(86400),
            "sk_".into(),
        );
        // Token generation and validation never touch the DB
        let db = Arc::new(sea_orm::DatabaseConnection::default());
        AuthService::new(cfg, db)
    }

    fn test_account() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "ops@example.com".into(),
            password_hash: String::new(),
            full_name: "Ops Manager".into(),
            role: "manager".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn issued_access_token_validates() {
        let service = test_service();
        let pair = service.generate_token(&test_account()).unwrap();

        let claims = service.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("manager"));
        assert!(claims
            .permissions
            .contains(&consts::BIDS_WRITE.to_string()));
    }

    #[test]
    fn tampered_token_rejected() {
        let service = test_service();
        let pair = service.generate_token(&test_account()).unwrap();
        let mut forged = pair.access_token.clone();
        forged.push('x');
        assert!(matches!(
            service.validate_token(&forged),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let service = test_service();
        let other = AuthService::new(
            AuthConfig::new(
                "a-completely-different-secret-key-value".into(),
                Duration::from_secs(3600),
                Duration::from_secs(86400),
                "sk_".into(),
            ),
            Arc::new(sea_orm::DatabaseConnection::default()),
        );
        let pair = other.generate_token(&test_account()).unwrap();
        assert!(service.validate_token(&pair.access_token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let service = test_service();
        let hash = service.hash_password("correct horse").unwrap();
        assert!(service.verify_password("correct horse", &hash).unwrap());
        assert!(!service.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn admin_bypasses_permission_set() {
        let principal = AuthUser {
            user_id: Uuid::new_v4(),
            email: None,
            role: Some("admin".into()),
            permissions: vec![],
            token_id: "t".into(),
            is_api_token: false,
        };
        assert!(principal.is_admin());
        assert!(!principal.has_permission(consts::BIDS_READ));
    }
}
