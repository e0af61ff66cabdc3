use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_API_TOKEN_PREFIX: &str = "sk_";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_for_local_use_only_never_in_prod";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key (minimum 32 characters)
    #[validate(length(min = 32), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT access token expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: usize,

    /// Refresh token expiration in seconds
    #[serde(default = "default_refresh_expiration")]
    pub refresh_token_expiration: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin (development escape hatch)
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Prefix for minted API tokens
    #[serde(default = "default_api_token_prefix")]
    pub api_token_prefix: String,

    /// Maximum number of database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum number of database connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Database connect timeout in seconds
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.trim().is_empty() {
        let mut err = ValidationError::new("jwt_secret_blank");
        err.message = Some("JWT secret must not be blank".into());
        return Err(err);
    }
    Ok(())
}

impl AppConfig {
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Constraints that cannot be expressed through the derive macros.
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET {
            let mut err = ValidationError::new("jwt_secret_default_dev");
            err.message = Some(
                "The bundled development JWT secret must not be used outside development. Set APP__JWT_SECRET to a unique, secure value."
                    .into(),
            );
            errors.add("jwt_secret", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_pool_bounds");
            err.message = Some("db_min_connections must not exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_jwt_expiration() -> usize {
    3600
}

fn default_refresh_expiration() -> usize {
    604800
}

fn default_api_token_prefix() -> String {
    DEFAULT_API_TOKEN_PREFIX.to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    10
}

/// Initialize the tracing subscriber with an env-filter.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("fleetcrm_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Load configuration from `config/{default,<env>}.toml` plus `APP__*`
/// environment variables. The JWT secret has no default and must be provided.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://fleetcrm.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Check for jwt_secret before deserialization to provide a clear error message
    if config.get_string("jwt_secret").is_err() {
        error!("JWT secret is not configured. Set APP__JWT_SECRET with a secure random string (minimum 32 characters).");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "jwt_secret is required but not configured. Set APP__JWT_SECRET environment variable."
                .into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "a".repeat(48),
            jwt_expiration: 3600,
            refresh_token_expiration: 604800,
            host: default_host(),
            port: DEFAULT_PORT,
            environment: "development".into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            api_token_prefix: default_api_token_prefix(),
            db_max_connections: 10,
            db_min_connections: 1,
            db_connect_timeout_secs: 10,
        }
    }

    #[test]
    fn valid_config_passes() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn short_jwt_secret_rejected() {
        let cfg = AppConfig {
            jwt_secret: "short".into(),
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn dev_secret_rejected_in_production() {
        let cfg = AppConfig {
            environment: "production".into(),
            jwt_secret: DEV_DEFAULT_JWT_SECRET.into(),
            ..base_config()
        };
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn pool_bounds_validated() {
        let cfg = AppConfig {
            db_min_connections: 20,
            ..base_config()
        };
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn permissive_cors_only_in_development_or_override() {
        let dev = base_config();
        assert!(dev.should_allow_permissive_cors());

        let prod = AppConfig {
            environment: "production".into(),
            ..base_config()
        };
        assert!(!prod.should_allow_permissive_cors());

        let overridden = AppConfig {
            environment: "production".into(),
            cors_allow_any_origin: true,
            ..base_config()
        };
        assert!(overridden.should_allow_permissive_cors());
    }
}
