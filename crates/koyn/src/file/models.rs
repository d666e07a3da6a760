//! Stored file metadata.

use serde::Serialize;
use sqlx::FromRow;

/// A stored attachment row. The bytes live in the object store; this is
/// the bookkeeping record.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub user_id: i64,
    pub created_at: String,
}

/// Fields for inserting a new file row.
#[derive(Debug, Clone)]
pub struct CreateFile {
    pub original_name: String,
    pub stored_name: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub user_id: i64,
}
