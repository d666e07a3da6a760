//! Community posts.

mod models;
mod repository;
mod service;

pub use models::{AttachmentUpload, CreatePost, Post, PostDraft};
pub use repository::PostRepository;
pub use service::PostService;
