//! Exchange account linking and wallet reads.

mod client;
mod models;
mod repository;
mod service;

pub use client::{ExchangeApi, ExchangeApiError, RestExchangeClient};
pub use models::{
    AccountState, AccountStatus, ConnectRequest, ConnectResponse, ExchangeAccount, WalletBalance,
};
pub use repository::ExchangeAccountRepository;
pub use service::ExchangeService;
