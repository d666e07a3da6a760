//! News read side.

use tracing::instrument;

use super::models::{News, NewsCategory};
use super::repository::NewsRepository;
use crate::api::{ApiError, ApiResult};

const LATEST_LIMIT: i64 = 100;

/// Service for reading collected news.
#[derive(Debug, Clone)]
pub struct NewsService {
    repo: NewsRepository,
}

impl NewsService {
    pub fn new(repo: NewsRepository) -> Self {
        Self { repo }
    }

    /// Latest articles, optionally filtered by category name.
    #[instrument(skip(self))]
    pub async fn latest(&self, category: Option<&str>) -> ApiResult<Vec<News>> {
        let category = match category {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.parse::<NewsCategory>()
                    .map_err(|_| ApiError::InvalidNewsCategory(raw.to_string()))?,
            ),
            _ => None,
        };

        let normalized = category.map(|c| c.to_string());
        Ok(self
            .repo
            .list_latest(normalized.as_deref(), LATEST_LIMIT)
            .await?)
    }

    /// Fetch one article and bump its view counter.
    #[instrument(skip(self))]
    pub async fn read(&self, id: i64) -> ApiResult<News> {
        let news = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NewsNotFound)?;

        self.repo.increment_view_count(id).await?;

        Ok(News {
            view_count: news.view_count + 1,
            ..news
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::news::models::CreateNews;

    async fn fixture() -> (NewsService, NewsRepository) {
        let db = Database::in_memory().await.unwrap();
        let repo = NewsRepository::new(db.pool().clone());
        (NewsService::new(repo.clone()), repo)
    }

    fn article(url: &str, category: NewsCategory, published_at: &str) -> CreateNews {
        CreateNews {
            title: format!("article {url}"),
            description: Some("snippet".to_string()),
            url: url.to_string(),
            image_url: None,
            source: "somewire".to_string(),
            published_at: published_at.to_string(),
            category: Some(category),
        }
    }

    #[tokio::test]
    async fn test_latest_orders_by_published_at() {
        let (service, repo) = fixture().await;
        repo.create(article("https://a", NewsCategory::Bitcoin, "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        repo.create(article("https://b", NewsCategory::Market, "2026-02-01T00:00:00Z"))
            .await
            .unwrap();

        let latest = service.latest(None).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].url, "https://b");
    }

    #[tokio::test]
    async fn test_latest_filters_by_category() {
        let (service, repo) = fixture().await;
        repo.create(article("https://a", NewsCategory::Bitcoin, "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        repo.create(article("https://b", NewsCategory::Market, "2026-02-01T00:00:00Z"))
            .await
            .unwrap();

        let bitcoin = service.latest(Some("bitcoin")).await.unwrap();
        assert_eq!(bitcoin.len(), 1);
        assert_eq!(bitcoin[0].url, "https://a");
    }

    #[tokio::test]
    async fn test_latest_rejects_unknown_category() {
        let (service, _) = fixture().await;
        let err = service.latest(Some("dogecoin")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidNewsCategory(_)));
    }

    #[tokio::test]
    async fn test_read_increments_view_count() {
        let (service, repo) = fixture().await;
        let created = repo
            .create(article("https://a", NewsCategory::Bitcoin, "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(created.view_count, 0);

        let read = service.read(created.id).await.unwrap();
        assert_eq!(read.view_count, 1);

        let again = service.read(created.id).await.unwrap();
        assert_eq!(again.view_count, 2);
    }

    #[tokio::test]
    async fn test_read_unknown_id() {
        let (service, _) = fixture().await;
        assert!(matches!(
            service.read(42).await.unwrap_err(),
            ApiError::NewsNotFound
        ));
    }
}
