//! OAuth provider userinfo client.

use serde_json::Value;
use std::time::Duration;

use crate::api::{ApiError, ApiResult};
use crate::config::OAuthConfig;

/// Fetches userinfo documents from configured providers.
pub struct OAuthClient {
    config: OAuthConfig,
    client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Exchange a provider access token for its userinfo document.
    pub async fn fetch_userinfo(&self, provider: &str, access_token: &str) -> ApiResult<Value> {
        let url = match provider {
            "google" => &self.config.google_userinfo_url,
            "kakao" => &self.config.kakao_userinfo_url,
            other => return Err(ApiError::UnsupportedProvider(other.to_string())),
        };

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::OAuthProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::OAuthProviderError(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::OAuthProviderError(e.to_string()))
    }
}
