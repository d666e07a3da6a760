//! Exchange account handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::api::{ApiResult, state::AppState};
use crate::auth::CurrentUser;
use crate::exchange::{AccountStatus, ConnectRequest, ConnectResponse, WalletBalance};

/// `POST /exchange/connect`
pub async fn connect_exchange(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    Ok(Json(state.exchange.connect(request, &user.identity).await?))
}

/// `GET /exchange/status`
pub async fn exchange_status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<AccountStatus>> {
    Ok(Json(state.exchange.status(&user.identity).await?))
}

/// `GET /exchange/wallet`
pub async fn exchange_wallet(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<WalletBalance>>> {
    Ok(Json(state.exchange.wallet(&user.identity).await?))
}

/// `DELETE /exchange`
pub async fn disconnect_exchange(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<StatusCode> {
    state.exchange.disconnect(&user.identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
