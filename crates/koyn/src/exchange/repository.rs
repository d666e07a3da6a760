//! Exchange account repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{AccountState, ExchangeAccount};

const ACCOUNT_COLUMNS: &str = "id, user_id, access_key, secret_key, nickname, state, \
                               last_sync_at, created_at, updated_at";

/// Repository for linked exchange accounts. One row per user.
#[derive(Debug, Clone)]
pub struct ExchangeAccountRepository {
    pool: SqlitePool,
}

impl ExchangeAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, access_key, secret_key, nickname))]
    pub async fn create(
        &self,
        user_id: i64,
        access_key: &str,
        secret_key: &str,
        nickname: Option<&str>,
    ) -> Result<ExchangeAccount> {
        sqlx::query(
            r#"
            INSERT INTO exchange_accounts
                (user_id, access_key, secret_key, nickname, state, last_sync_at)
            VALUES (?, ?, ?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
            "#,
        )
        .bind(user_id)
        .bind(access_key)
        .bind(secret_key)
        .bind(nickname)
        .bind(AccountState::Active.to_string())
        .execute(&self.pool)
        .await
        .context("inserting exchange account")?;

        self.find_by_user(user_id)
            .await?
            .context("exchange account not found after insert")
    }

    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<ExchangeAccount>> {
        let account = sqlx::query_as::<_, ExchangeAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM exchange_accounts WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching exchange account")?;

        Ok(account)
    }

    /// Replace the key pair (and optionally the nickname) on an existing
    /// link, stamping the sync time.
    #[instrument(skip(self, access_key, secret_key, nickname))]
    pub async fn update_keys(
        &self,
        user_id: i64,
        access_key: &str,
        secret_key: &str,
        nickname: Option<&str>,
    ) -> Result<ExchangeAccount> {
        sqlx::query(
            r#"
            UPDATE exchange_accounts
            SET access_key = ?, secret_key = ?,
                nickname = COALESCE(?, nickname),
                state = ?,
                last_sync_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now'),
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
            WHERE user_id = ?
            "#,
        )
        .bind(access_key)
        .bind(secret_key)
        .bind(nickname)
        .bind(AccountState::Active.to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("updating exchange account keys")?;

        self.find_by_user(user_id)
            .await?
            .context("exchange account not found after update")
    }

    /// Stamp a successful sync against the venue.
    #[instrument(skip(self))]
    pub async fn touch_sync(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE exchange_accounts
            SET last_sync_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("stamping exchange sync time")?;

        Ok(())
    }

    /// Remove a link. Returns whether a row existed.
    #[instrument(skip(self))]
    pub async fn delete_by_user(&self, user_id: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM exchange_accounts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("deleting exchange account")?
            .rows_affected();

        Ok(affected > 0)
    }
}
