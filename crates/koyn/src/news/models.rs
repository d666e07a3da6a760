//! News data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// News category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewsCategory {
    Cryptocurrency,
    Blockchain,
    Finance,
    Technology,
    Market,
    Bitcoin,
    Ethereum,
}

impl std::fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NewsCategory::Cryptocurrency => "CRYPTOCURRENCY",
            NewsCategory::Blockchain => "BLOCKCHAIN",
            NewsCategory::Finance => "FINANCE",
            NewsCategory::Technology => "TECHNOLOGY",
            NewsCategory::Market => "MARKET",
            NewsCategory::Bitcoin => "BITCOIN",
            NewsCategory::Ethereum => "ETHEREUM",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CRYPTOCURRENCY" => Ok(NewsCategory::Cryptocurrency),
            "BLOCKCHAIN" => Ok(NewsCategory::Blockchain),
            "FINANCE" => Ok(NewsCategory::Finance),
            "TECHNOLOGY" => Ok(NewsCategory::Technology),
            "MARKET" => Ok(NewsCategory::Market),
            "BITCOIN" => Ok(NewsCategory::Bitcoin),
            "ETHEREUM" => Ok(NewsCategory::Ethereum),
            _ => Err(format!("unknown category: {}", s)),
        }
    }
}

impl TryFrom<String> for NewsCategory {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A collected news article.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub published_at: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub view_count: i64,
    pub created_at: String,
}

/// Fields for inserting a collected article.
#[derive(Debug, Clone)]
pub struct CreateNews {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub published_at: String,
    pub category: Option<NewsCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        assert_eq!(NewsCategory::Bitcoin.to_string(), "BITCOIN");
        assert_eq!("bitcoin".parse::<NewsCategory>().unwrap(), NewsCategory::Bitcoin);
        assert_eq!("MARKET".parse::<NewsCategory>().unwrap(), NewsCategory::Market);
        assert!("dogecoin".parse::<NewsCategory>().is_err());
    }
}
