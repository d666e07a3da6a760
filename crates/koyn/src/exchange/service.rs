//! Exchange account linking and wallet reads.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::client::{ExchangeApi, ExchangeApiError};
use super::models::{AccountStatus, ConnectRequest, ConnectResponse, WalletBalance};
use super::repository::ExchangeAccountRepository;
use crate::api::{ApiError, ApiResult};
use crate::auth::Identity;

/// Service for exchange account linking.
#[derive(Clone)]
pub struct ExchangeService {
    repo: ExchangeAccountRepository,
    client: Arc<dyn ExchangeApi>,
}

impl ExchangeService {
    pub fn new(repo: ExchangeAccountRepository, client: Arc<dyn ExchangeApi>) -> Self {
        Self { repo, client }
    }

    /// Link (or re-link) the caller's exchange account after validating the
    /// submitted key pair against the venue.
    #[instrument(skip(self, request, identity), fields(subject = identity.subject_id))]
    pub async fn connect(
        &self,
        request: ConnectRequest,
        identity: &Identity,
    ) -> ApiResult<ConnectResponse> {
        if request.access_key.trim().is_empty() {
            return Err(ApiError::invalid_field("access_key", "must not be empty"));
        }
        if request.secret_key.trim().is_empty() {
            return Err(ApiError::invalid_field("secret_key", "must not be empty"));
        }

        let valid = self
            .client
            .validate_keys(&request.access_key, &request.secret_key)
            .await
            .map_err(|e| ApiError::ExchangeConnectionFailed(e.to_string()))?;
        if !valid {
            warn!(subject = identity.subject_id, "exchange key validation rejected");
            return Err(ApiError::InvalidExchangeKeys);
        }

        let existing = self.repo.find_by_user(identity.subject_id).await?;
        let account = match existing {
            Some(_) => {
                self.repo
                    .update_keys(
                        identity.subject_id,
                        &request.access_key,
                        &request.secret_key,
                        request.nickname.as_deref(),
                    )
                    .await?
            }
            None => {
                self.repo
                    .create(
                        identity.subject_id,
                        &request.access_key,
                        &request.secret_key,
                        request.nickname.as_deref(),
                    )
                    .await?
            }
        };

        debug!(subject = identity.subject_id, "exchange account linked");
        Ok(ConnectResponse {
            success: true,
            message: "Exchange account connected".to_string(),
            state: account.state,
            nickname: account.nickname,
        })
    }

    /// Link status for the caller.
    pub async fn status(&self, identity: &Identity) -> ApiResult<AccountStatus> {
        let status = match self.repo.find_by_user(identity.subject_id).await? {
            Some(account) => AccountStatus {
                connected: true,
                state: Some(account.state),
                nickname: account.nickname,
                last_sync_at: account.last_sync_at,
            },
            None => AccountStatus {
                connected: false,
                state: None,
                nickname: None,
                last_sync_at: None,
            },
        };

        Ok(status)
    }

    /// Live balances for the caller's linked account.
    #[instrument(skip(self, identity), fields(subject = identity.subject_id))]
    pub async fn wallet(&self, identity: &Identity) -> ApiResult<Vec<WalletBalance>> {
        let account = self
            .repo
            .find_by_user(identity.subject_id)
            .await?
            .ok_or(ApiError::ExchangeNotLinked)?;

        let balances = self
            .client
            .balances(&account.access_key, &account.secret_key)
            .await
            .map_err(|e| match e {
                // Keys were valid at link time; a 401 now means they were
                // revoked on the venue side.
                ExchangeApiError::Unauthorized => ApiError::InvalidExchangeKeys,
                other => ApiError::ExchangeConnectionFailed(other.to_string()),
            })?;

        self.repo.touch_sync(identity.subject_id).await?;
        Ok(balances)
    }

    /// Remove the caller's link.
    #[instrument(skip(self, identity), fields(subject = identity.subject_id))]
    pub async fn disconnect(&self, identity: &Identity) -> ApiResult<()> {
        if !self.repo.delete_by_user(identity.subject_id).await? {
            return Err(ApiError::ExchangeNotLinked);
        }

        debug!(subject = identity.subject_id, "exchange account unlinked");
        Ok(())
    }
}
