//! File handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::read_multipart;
use crate::api::{ApiError, ApiResult, state::AppState};
use crate::auth::CurrentUser;
use crate::file::StoredFile;

/// `POST /files` — multipart with a single `file` part.
pub async fn upload_file(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredFile>)> {
    let (_, upload) = read_multipart(multipart).await?;
    let Some(part) = upload else {
        return Err(ApiError::invalid_field("file", "missing file part"));
    };

    let file = state
        .files
        .upload(&part.file_name, part.content_type, part.data, &user.identity)
        .await?;

    Ok((StatusCode::CREATED, Json(file)))
}

/// `GET /files` — the caller's files.
pub async fn list_files(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<StoredFile>>> {
    Ok(Json(state.files.list_for(&user.identity).await?))
}

/// `GET /files/{id}`
pub async fn get_file(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<StoredFile>> {
    Ok(Json(state.files.find_by_id(id).await?))
}

/// `DELETE /files/{id}`
pub async fn delete_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.files.delete(id, &user.identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /uploads/{*key}` — raw stored objects. Public by policy, like the
/// original's public-read bucket.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let bytes = state.files.read_object(&key).await?;
    let mime = mime_guess::from_path(&key).first_or_octet_stream();

    Ok((
        [(header::CONTENT_TYPE, mime.essence_str().to_string())],
        bytes,
    )
        .into_response())
}
