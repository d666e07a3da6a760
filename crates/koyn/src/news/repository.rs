//! News repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{CreateNews, News};

const NEWS_COLUMNS: &str = "id, title, description, url, image_url, source, published_at, \
                            content, category, view_count, created_at";

/// Repository for news rows.
#[derive(Debug, Clone)]
pub struct NewsRepository {
    pool: SqlitePool,
}

impl NewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, news), fields(url = %news.url))]
    pub async fn create(&self, news: CreateNews) -> Result<News> {
        let id = sqlx::query(
            r#"
            INSERT INTO news (title, description, url, image_url, source, published_at, category)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&news.title)
        .bind(&news.description)
        .bind(&news.url)
        .bind(&news.image_url)
        .bind(&news.source)
        .bind(&news.published_at)
        .bind(news.category.map(|c| c.to_string()))
        .execute(&self.pool)
        .await
        .context("inserting news")?
        .last_insert_rowid();

        self.find_by_id(id)
            .await?
            .context("news not found after insert")
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<News>> {
        let news = sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM news WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching news")?;

        Ok(news)
    }

    #[instrument(skip(self))]
    pub async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await
            .context("counting news by url")?;

        Ok(count > 0)
    }

    /// Latest articles, optionally filtered by category.
    #[instrument(skip(self))]
    pub async fn list_latest(&self, category: Option<&str>, limit: i64) -> Result<Vec<News>> {
        let news = match category {
            Some(category) => {
                sqlx::query_as::<_, News>(&format!(
                    "SELECT {NEWS_COLUMNS} FROM news WHERE category = ? \
                     ORDER BY published_at DESC, id DESC LIMIT ?"
                ))
                .bind(category)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, News>(&format!(
                    "SELECT {NEWS_COLUMNS} FROM news ORDER BY published_at DESC, id DESC LIMIT ?"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("listing news")?;

        Ok(news)
    }

    /// Bump the view counter.
    #[instrument(skip(self))]
    pub async fn increment_view_count(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE news SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("incrementing view count")?;

        Ok(())
    }
}
