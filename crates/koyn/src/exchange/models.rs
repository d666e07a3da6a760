//! Exchange account models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Link state of an exchange account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    #[default]
    Active,
    Suspended,
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountState::Active => write!(f, "active"),
            AccountState::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for AccountState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountState::Active),
            "suspended" => Ok(AccountState::Suspended),
            _ => Err(format!("unknown account state: {}", s)),
        }
    }
}

impl TryFrom<String> for AccountState {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A linked exchange account.
///
/// Key material never leaves the process: it is excluded from
/// serialization, and the Debug impl below redacts it from log output.
#[derive(Clone, Serialize, FromRow)]
pub struct ExchangeAccount {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub nickname: Option<String>,
    #[sqlx(try_from = "String")]
    pub state: AccountState,
    pub last_sync_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl std::fmt::Debug for ExchangeAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeAccount")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("nickname", &self.nickname)
            .field("state", &self.state)
            .field("last_sync_at", &self.last_sync_at)
            .finish()
    }
}

/// Request body for linking an account. No Debug derive: the keys must not
/// end up in logs through error formatting.
#[derive(Deserialize)]
pub struct ConnectRequest {
    pub access_key: String,
    pub secret_key: String,
    pub nickname: Option<String>,
}

/// Result of a connect call.
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
    pub state: AccountState,
    pub nickname: Option<String>,
}

/// Link status for the current user.
#[derive(Debug, Serialize)]
pub struct AccountStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AccountState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<String>,
}

/// One currency balance as reported by the venue. Amounts stay strings;
/// the venue serializes decimals that way and we do not do arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub currency: String,
    pub balance: String,
    pub locked: String,
    pub avg_buy_price: String,
    pub unit_currency: String,
}
