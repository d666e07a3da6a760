//! Exchange REST client.

use async_trait::async_trait;
use axum::http::StatusCode;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::models::WalletBalance;
use crate::config::ExchangeConfig;

/// Failures talking to the venue.
#[derive(Debug, Error)]
pub enum ExchangeApiError {
    /// The venue rejected the key pair.
    #[error("exchange rejected the API keys")]
    Unauthorized,

    /// Transport-level failure.
    #[error("exchange request failed: {0}")]
    Request(String),

    /// Unexpected venue status.
    #[error("exchange returned status {0}")]
    Api(u16),
}

/// Venue API boundary. The service talks to this trait; production wires
/// in [`RestExchangeClient`], tests substitute a stub.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Check a key pair by fetching the account list.
    async fn validate_keys(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<bool, ExchangeApiError>;

    /// Fetch wallet balances for a key pair.
    async fn balances(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Vec<WalletBalance>, ExchangeApiError>;
}

/// Payload of the venue's signed request token.
#[derive(Serialize)]
struct VenueClaims {
    access_key: String,
    nonce: String,
}

/// HTTP implementation against an Upbit-style REST API.
pub struct RestExchangeClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestExchangeClient {
    pub fn new(config: &ExchangeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The venue authenticates with an HS256 token signed by the account's
    /// secret key, carrying the access key and a single-use nonce.
    fn auth_token(access_key: &str, secret_key: &str) -> Result<String, ExchangeApiError> {
        let claims = VenueClaims {
            access_key: access_key.to_string(),
            nonce: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret_key.as_bytes()),
        )
        .map_err(|e| ExchangeApiError::Request(e.to_string()))
    }

    async fn accounts(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Vec<WalletBalance>, ExchangeApiError> {
        let token = Self::auth_token(access_key, secret_key)?;

        let response = self
            .client
            .get(format!("{}/v1/accounts", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ExchangeApiError::Request(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<Vec<WalletBalance>>()
                .await
                .map_err(|e| ExchangeApiError::Request(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(ExchangeApiError::Unauthorized),
            status => Err(ExchangeApiError::Api(status.as_u16())),
        }
    }
}

#[async_trait]
impl ExchangeApi for RestExchangeClient {
    async fn validate_keys(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<bool, ExchangeApiError> {
        match self.accounts(access_key, secret_key).await {
            Ok(_) => Ok(true),
            Err(ExchangeApiError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn balances(
        &self,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Vec<WalletBalance>, ExchangeApiError> {
        self.accounts(access_key, secret_key).await
    }
}
