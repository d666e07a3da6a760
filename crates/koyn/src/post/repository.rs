//! Post repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{CreatePost, Post};

const POST_COLUMNS: &str =
    "id, title, content, writer, user_id, file_url, file_name, file_key, created_at, updated_at";

/// Repository for post rows.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    pub async fn create(&self, post: CreatePost) -> Result<Post> {
        let id = sqlx::query(
            r#"
            INSERT INTO posts (title, content, writer, user_id, file_url, file_name, file_key)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.writer)
        .bind(post.user_id)
        .bind(&post.file_url)
        .bind(&post.file_name)
        .bind(&post.file_key)
        .execute(&self.pool)
        .await
        .context("inserting post")?
        .last_insert_rowid();

        self.find_by_id(id)
            .await?
            .context("post not found after insert")
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching post")?;

        Ok(post)
    }

    /// All posts, newest first.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing posts")?;

        Ok(posts)
    }

    /// One author's posts, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("listing posts by user")?;

        Ok(posts)
    }

    /// Persist updated fields of an existing post.
    #[instrument(skip(self, post), fields(id = post.id))]
    pub async fn update(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, writer = ?, file_url = ?, file_name = ?, file_key = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.writer)
        .bind(&post.file_url)
        .bind(&post.file_name)
        .bind(&post.file_key)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("updating post")?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting post")?;

        Ok(())
    }
}
