//! Application configuration.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `KOYN_`-prefixed environment variables (`KOYN_SERVER__PORT=9000`).

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub slack: SlackConfig,
    pub news: NewsConfig,
    pub exchange: ExchangeConfig,
    pub oauth: OAuthConfig,
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let config = builder
            .add_source(Environment::with_prefix("KOYN").separator("__"))
            .build()
            .context("building configuration")?;

        config
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Render the resolved configuration as TOML with secrets redacted.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.auth.secret.is_some() {
            shown.auth.secret = Some("<redacted>".to_string());
        }
        if shown.slack.webhook_url.is_some() {
            shown.slack.webhook_url = Some("<redacted>".to_string());
        }
        if shown.news.api_key.is_some() {
            shown.news.api_key = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&shown).context("serializing configuration")
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum multipart upload size in megabytes.
    pub max_upload_size_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_size_mb: 10,
        }
    }
}

/// Token issuance and path policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret. Supports `env:VAR_NAME` indirection.
    /// REQUIRED for serving; never logged.
    pub secret: Option<String>,

    /// Token validity window in seconds.
    pub token_validity_secs: i64,

    /// Additional public path prefixes on top of the built-in table.
    pub public_paths: Vec<String>,

    /// Upper bound for the per-request subject lookup, in milliseconds.
    pub lookup_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_validity_secs: 30 * 60,
            public_paths: Vec::new(),
            lookup_timeout_ms: 2000,
        }
    }
}

impl AuthConfig {
    /// Resolve the signing secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration for serving.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret = self.resolve_secret()?;

        let Some(secret) = secret else {
            return Err(ConfigValidationError::MissingSecret);
        };

        // HMAC-SHA-256 keys shorter than the block size weaken the MAC
        if secret.len() < 32 {
            return Err(ConfigValidationError::SecretTooShort);
        }

        if self.token_validity_secs <= 0 {
            return Err(ConfigValidationError::InvalidValidity(
                self.token_validity_secs,
            ));
        }

        Ok(())
    }

    /// Generate a random signing secret using the OS CSPRNG.
    pub fn generate_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("auth.secret is required")]
    MissingSecret,

    #[error("auth.secret must be at least 32 bytes")]
    SecretTooShort,

    #[error("auth.token_validity_secs must be positive, got {0}")]
    InvalidValidity(i64),

    #[error("environment variable {0} is not set")]
    EnvVarNotFound(String),

    #[error("environment variable {0} is empty")]
    EnvVarEmpty(String),
}

/// SQLite database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("koyn.db"),
        }
    }
}

/// Local object store for uploaded attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory where uploaded objects are written.
    pub root: PathBuf,
    /// URL prefix under which stored objects are served.
    pub public_base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/uploads"),
            public_base: "/uploads".to_string(),
        }
    }
}

/// Slack webhook notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub alert_channel: String,
    pub error_channel: String,
    pub username: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            alert_channel: "#alerts".to_string(),
            error_channel: "#errors".to_string(),
            username: "koyn-bot".to_string(),
        }
    }
}

/// Scheduled news collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub enabled: bool,
    /// Search API key. Collection is skipped when unset.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub interval_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: "https://serpapi.com/search.json".to_string(),
            interval_secs: 3600,
        }
    }
}

/// Exchange REST API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.upbit.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// OAuth2 provider userinfo endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google_userinfo_url: String,
    pub kakao_userinfo_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google_userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            kakao_userinfo_url: "https://kapi.kakao.com/v2/user/me".to_string(),
        }
    }
}
