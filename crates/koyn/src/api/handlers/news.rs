//! News handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ApiResult, state::AppState};
use crate::auth::CurrentUser;
use crate::news::News;

/// Query string for the news list.
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
}

/// `GET /news?category=`
pub async fn list_news(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Json<Vec<News>>> {
    Ok(Json(state.news.latest(query.category.as_deref()).await?))
}

/// `GET /news/{id}` — also bumps the view counter.
pub async fn get_news(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<News>> {
    Ok(Json(state.news.read(id).await?))
}
