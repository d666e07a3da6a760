//! Scheduled news collection.
//!
//! A background task polls a SERP-style search feed per keyword and inserts
//! articles that are new by URL. Collection failures are logged and the
//! loop keeps going; the read side never depends on the collector.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

use super::models::{CreateNews, NewsCategory};
use super::repository::NewsRepository;
use crate::config::NewsConfig;

/// Search keywords and the category their results land in.
const KEYWORDS: &[(&str, NewsCategory)] = &[
    ("cryptocurrency bitcoin", NewsCategory::Bitcoin),
    ("ethereum blockchain", NewsCategory::Ethereum),
    ("crypto market", NewsCategory::Market),
    ("blockchain technology", NewsCategory::Blockchain),
];

/// Background news collector.
pub struct NewsCollector {
    repo: NewsRepository,
    client: reqwest::Client,
    config: NewsConfig,
}

impl NewsCollector {
    pub fn new(repo: NewsRepository, config: NewsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            repo,
            client,
            config,
        }
    }

    /// Spawn the interval loop. Returns immediately; errors inside the loop
    /// are logged, never fatal.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(self.config.interval_secs.max(60));
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = self.collect_once().await {
                    error!("news collection failed: {e:#}");
                }
            }
        })
    }

    /// One collection round over all keywords.
    pub async fn collect_once(&self) -> Result<usize> {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            info!("news collection skipped: no API key configured");
            return Ok(0);
        };

        let mut total = 0;
        for (keyword, category) in KEYWORDS {
            match self.collect_keyword(api_key, keyword, *category).await {
                Ok(count) => {
                    info!("keyword '{keyword}': {count} new articles");
                    total += count;
                }
                Err(e) => warn!("keyword '{keyword}' collection failed: {e:#}"),
            }
        }

        Ok(total)
    }

    async fn collect_keyword(
        &self,
        api_key: &str,
        keyword: &str,
        category: NewsCategory,
    ) -> Result<usize> {
        let feed = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", keyword),
                ("tbm", "nws"),
                ("num", "10"),
                ("api_key", api_key),
            ])
            .send()
            .await
            .context("requesting news feed")?
            .error_for_status()
            .context("news feed returned an error status")?
            .json::<Value>()
            .await
            .context("decoding news feed")?;

        let mut inserted = 0;
        for draft in parse_feed(&feed, category) {
            if !self.repo.exists_by_url(&draft.url).await? {
                self.repo.create(draft).await?;
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}

/// Map feed entries to insertable drafts. Entries without a usable link or
/// title are skipped.
fn parse_feed(feed: &Value, category: NewsCategory) -> Vec<CreateNews> {
    let Some(results) = feed.get("news_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|item| {
            let url = item.get("link")?.as_str()?.to_string();
            let title = clean_text(item.get("title")?.as_str()?);
            if title.is_empty() {
                return None;
            }

            Some(CreateNews {
                title,
                description: item
                    .get("snippet")
                    .and_then(Value::as_str)
                    .map(clean_text)
                    .filter(|s| !s.is_empty()),
                url,
                image_url: item
                    .get("thumbnail")
                    .and_then(Value::as_str)
                    .map(String::from),
                source: item
                    .get("source")
                    .and_then(Value::as_str)
                    .map(clean_text)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown".to_string()),
                published_at: parse_published(item.get("date").and_then(Value::as_str)),
                category: Some(category),
            })
        })
        .collect()
}

fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Feed dates are loose ("02/07/2026", relative phrases, sometimes absent).
/// Anything unparseable lands on the collection time so ordering stays
/// total.
fn parse_published(raw: Option<&str>) -> String {
    if let Some(raw) = raw {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
            let midnight = date.and_time(NaiveTime::MIN).and_utc();
            return midnight.to_rfc3339_opts(SecondsFormat::Secs, true);
        }
    }

    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_feed_maps_fields() {
        let feed = json!({
            "news_results": [
                {
                    "title": "  Bitcoin   hits a new high  ",
                    "snippet": "markets move",
                    "link": "https://example.com/a",
                    "thumbnail": "https://example.com/a.png",
                    "source": "Example Wire",
                    "date": "02/07/2026"
                }
            ]
        });

        let drafts = parse_feed(&feed, NewsCategory::Bitcoin);
        assert_eq!(drafts.len(), 1);

        let draft = &drafts[0];
        assert_eq!(draft.title, "Bitcoin hits a new high");
        assert_eq!(draft.description.as_deref(), Some("markets move"));
        assert_eq!(draft.url, "https://example.com/a");
        assert_eq!(draft.source, "Example Wire");
        assert_eq!(draft.published_at, "2026-02-07T00:00:00Z");
        assert_eq!(draft.category, Some(NewsCategory::Bitcoin));
    }

    #[test]
    fn test_parse_feed_skips_entries_without_link() {
        let feed = json!({
            "news_results": [
                { "title": "no link here" },
                { "title": "good", "link": "https://example.com/b" }
            ]
        });

        let drafts = parse_feed(&feed, NewsCategory::Market);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].url, "https://example.com/b");
    }

    #[test]
    fn test_parse_feed_without_results_is_empty() {
        assert!(parse_feed(&json!({}), NewsCategory::Market).is_empty());
        assert!(parse_feed(&json!({"news_results": "nope"}), NewsCategory::Market).is_empty());
    }

    #[test]
    fn test_parse_published_fallback_is_now_shaped() {
        let fallback = parse_published(Some("3 hours ago"));
        assert!(fallback.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&fallback).is_ok());

        let absent = parse_published(None);
        assert!(DateTime::parse_from_rfc3339(&absent).is_ok());
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \n b\t c "), "a b c");
        assert_eq!(clean_text(""), "");
    }
}
