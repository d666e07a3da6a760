//! Collected crypto news: scheduled ingestion and the read side.

mod collector;
mod models;
mod repository;
mod service;

pub use collector::NewsCollector;
pub use models::{CreateNews, News, NewsCategory};
pub use repository::NewsRepository;
pub use service::NewsService;
