//! Post handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use super::read_multipart;
use crate::api::{ApiResult, state::AppState};
use crate::auth::CurrentUser;
use crate::post::{AttachmentUpload, Post, PostDraft};

/// `GET /posts`
pub async fn list_posts(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.posts.list_all().await?))
}

/// `GET /posts/mine`
pub async fn my_posts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Post>>> {
    let author = state.users.find_by_id(user.id()).await?;
    Ok(Json(state.posts.list_by_author(&author).await?))
}

/// `GET /posts/{id}`
pub async fn get_post(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.find_by_id(id).await?))
}

/// `POST /posts` — multipart: `title`, `content`, `writer`, optional `file`.
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let author = state.users.find_by_id(user.id()).await?;
    let (draft, upload) = read_post_body(multipart).await?;

    let post = state.posts.create(draft, upload, &author).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `PUT /posts/{id}` — same multipart shape as create.
pub async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<Post>> {
    let author = state.users.find_by_id(user.id()).await?;
    let (draft, upload) = read_post_body(multipart).await?;

    let post = state.posts.update(id, draft, upload, &author).await?;
    Ok(Json(post))
}

/// `DELETE /posts/{id}`
pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let author = state.users.find_by_id(user.id()).await?;
    state.posts.delete(id, &author).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_post_body(
    multipart: Multipart,
) -> ApiResult<(PostDraft, Option<AttachmentUpload>)> {
    let (mut fields, upload) = read_multipart(multipart).await?;

    let draft = PostDraft {
        title: fields.remove("title"),
        content: fields.remove("content"),
        writer: fields.remove("writer"),
    };

    let upload = upload.map(|part| AttachmentUpload {
        name: part.file_name,
        data: part.data,
    });

    Ok((draft, upload))
}
