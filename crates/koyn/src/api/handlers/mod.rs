//! HTTP handlers. Thin controllers: extract, delegate to a service, wrap
//! the result.

mod auth;
mod docs;
mod exchange;
mod files;
mod health;
mod news;
mod posts;
mod users;

pub use auth::{login, oauth_login, signup};
pub use docs::docs;
pub use exchange::{connect_exchange, disconnect_exchange, exchange_status, exchange_wallet};
pub use files::{delete_file, get_file, list_files, serve_upload, upload_file};
pub use health::health;
pub use news::{get_news, list_news};
pub use posts::{create_post, delete_post, get_post, list_posts, my_posts, update_post};
pub use users::me;

use axum::extract::Multipart;
use std::collections::BTreeMap;

use crate::api::{ApiError, ApiResult};

/// A file part pulled out of a multipart body.
pub(crate) struct UploadPart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Split a multipart body into its text fields and the optional `file`
/// part. An empty file part counts as no upload.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
) -> ApiResult<(BTreeMap<String, String>, Option<UploadPart>)> {
    let mut fields = BTreeMap::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_field("body", e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("file").to_string();
            let content_type = field.content_type().map(String::from);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::invalid_field("file", e.to_string()))?
                .to_vec();

            if !data.is_empty() {
                upload = Some(UploadPart {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_field(name.clone(), e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok((fields, upload))
}
