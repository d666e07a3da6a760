//! Post data models.

use serde::Serialize;
use sqlx::FromRow;

/// A community post, optionally carrying one stored attachment.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub writer: String,
    /// Author account. NULL for rows predating account linking.
    pub user_id: Option<i64>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Text fields submitted with a post. All optional: create fills defaults,
/// update keeps the existing values for absent fields.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub writer: Option<String>,
}

/// An uploaded attachment, as read out of the multipart body.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub name: String,
    pub data: Vec<u8>,
}

/// Fields for inserting a new post row.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub writer: String,
    pub user_id: Option<i64>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_key: Option<String>,
}
