//! Signup, login and OAuth login.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult, state::AppState};
use crate::oauth;
use crate::user::{LoginRequest, SignupRequest, User, UserInfo};

/// Login result: the signed credential plus the account it identifies.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.users.signup(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.users.login(request).await?;
    let token = issue_for(&state, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Request body for OAuth login: the provider access token obtained by the
/// client-side flow.
#[derive(Debug, Deserialize)]
pub struct OAuthLoginRequest {
    pub access_token: String,
}

/// `POST /oauth2/{provider}`
pub async fn oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(request): Json<OAuthLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let attributes = state
        .oauth
        .fetch_userinfo(&provider, &request.access_token)
        .await?;
    let profile = oauth::normalize(&provider, &attributes)?;
    let user = state.users.upsert_oauth(profile).await?;
    let token = issue_for(&state, &user)?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

fn issue_for(state: &AppState, user: &User) -> ApiResult<String> {
    state
        .codec
        .issue(
            user.id,
            &user.email,
            vec![user.role.to_string()],
            state.token_validity(),
        )
        .map_err(|e| ApiError::internal(format!("issuing credential: {e}")))
}
