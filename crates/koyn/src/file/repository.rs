//! File metadata repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{CreateFile, StoredFile};

const FILE_COLUMNS: &str =
    "id, original_name, stored_name, url, content_type, size, user_id, created_at";

/// Repository for file metadata rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, file), fields(name = %file.original_name))]
    pub async fn create(&self, file: CreateFile) -> Result<StoredFile> {
        let id = sqlx::query(
            r#"
            INSERT INTO files (original_name, stored_name, url, content_type, size, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(&file.url)
        .bind(&file.content_type)
        .bind(file.size)
        .bind(file.user_id)
        .execute(&self.pool)
        .await
        .context("inserting file")?
        .last_insert_rowid();

        self.find_by_id(id)
            .await?
            .context("file not found after insert")
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<StoredFile>> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching file")?;

        Ok(file)
    }

    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<StoredFile>> {
        let files = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("listing files by user")?;

        Ok(files)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting file")?;

        Ok(())
    }
}
