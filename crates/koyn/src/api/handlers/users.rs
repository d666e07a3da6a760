//! User profile handlers.

use axum::{Json, extract::State};

use crate::api::{ApiResult, state::AppState};
use crate::auth::CurrentUser;
use crate::user::UserInfo;

/// `GET /users/me`
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserInfo>> {
    let profile = state.users.find_by_id(user.id()).await?;
    Ok(Json(profile.into()))
}
