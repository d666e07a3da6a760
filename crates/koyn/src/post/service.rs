//! Post CRUD with attachment handling.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{AttachmentUpload, CreatePost, Post, PostDraft};
use super::repository::PostRepository;
use crate::api::{ApiError, ApiResult};
use crate::file::ObjectStore;
use crate::user::User;

const STORE_DIR: &str = "posts";

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_CONTENT: &str = "No content";

/// Service for community posts.
#[derive(Clone)]
pub struct PostService {
    repo: PostRepository,
    store: Arc<dyn ObjectStore>,
}

impl PostService {
    pub fn new(repo: PostRepository, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// Create a post, storing the attachment first when one was uploaded.
    #[instrument(skip(self, draft, upload, author), fields(author_id = author.id))]
    pub async fn create(
        &self,
        draft: PostDraft,
        upload: Option<AttachmentUpload>,
        author: &User,
    ) -> ApiResult<Post> {
        let attachment = match upload {
            Some(upload) => Some(self.store_attachment(&upload).await?),
            None => None,
        };

        let writer = draft
            .writer
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| author.username.clone());

        let (file_url, file_name, file_key) = match attachment {
            Some(a) => (Some(a.0), Some(a.1), Some(a.2)),
            None => (None, None, None),
        };

        let post = self
            .repo
            .create(CreatePost {
                title: non_empty_or(draft.title, DEFAULT_TITLE),
                content: non_empty_or(draft.content, DEFAULT_CONTENT),
                writer,
                user_id: Some(author.id),
                file_url,
                file_name,
                file_key,
            })
            .await?;

        debug!(post_id = post.id, "post created");
        Ok(post)
    }

    /// Fetch one post.
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Post> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::PostNotFound)
    }

    /// All posts, newest first.
    pub async fn list_all(&self) -> ApiResult<Vec<Post>> {
        Ok(self.repo.list_all().await?)
    }

    /// The author's own posts, newest first.
    pub async fn list_by_author(&self, author: &User) -> ApiResult<Vec<Post>> {
        Ok(self.repo.list_by_user(author.id).await?)
    }

    /// Update a post. Absent fields keep their existing values; a new
    /// attachment replaces the old one, removing the old object.
    #[instrument(skip(self, draft, upload, author), fields(author_id = author.id))]
    pub async fn update(
        &self,
        id: i64,
        draft: PostDraft,
        upload: Option<AttachmentUpload>,
        author: &User,
    ) -> ApiResult<Post> {
        let mut post = self.find_by_id(id).await?;
        self.ensure_owner(&post, author)?;

        if let Some(upload) = upload {
            if let Some(old_key) = post.file_key.take() {
                self.store
                    .delete(&old_key)
                    .await
                    .map_err(|e| ApiError::FileDeleteError(format!("{e:#}")))?;
            }
            let (url, name, key) = self.store_attachment(&upload).await?;
            post.file_url = Some(url);
            post.file_name = Some(name);
            post.file_key = Some(key);
        }

        if let Some(title) = draft.title.filter(|t| !t.is_empty()) {
            post.title = title;
        }
        if let Some(content) = draft.content.filter(|c| !c.is_empty()) {
            post.content = content;
        }
        if let Some(writer) = draft.writer.filter(|w| !w.is_empty()) {
            post.writer = writer;
        }

        self.repo.update(&post).await?;
        debug!(post_id = post.id, "post updated");
        self.find_by_id(id).await
    }

    /// Delete a post and its attachment.
    #[instrument(skip(self, author), fields(author_id = author.id))]
    pub async fn delete(&self, id: i64, author: &User) -> ApiResult<()> {
        let post = self.find_by_id(id).await?;
        self.ensure_owner(&post, author)?;

        if let Some(key) = post.file_key.as_deref() {
            self.store
                .delete(key)
                .await
                .map_err(|e| ApiError::FileDeleteError(format!("{e:#}")))?;
        }

        self.repo.delete(id).await?;
        debug!(post_id = id, "post deleted");
        Ok(())
    }

    /// Posts linked to an account belong to it; unlinked legacy rows are
    /// editable by anyone.
    fn ensure_owner(&self, post: &Post, author: &User) -> ApiResult<()> {
        match post.user_id {
            Some(owner_id) if owner_id != author.id => {
                warn!(post_id = post.id, author_id = author.id, "post access denied");
                Err(ApiError::NotPostOwner)
            }
            _ => Ok(()),
        }
    }

    async fn store_attachment(
        &self,
        upload: &AttachmentUpload,
    ) -> ApiResult<(String, String, String)> {
        let object = self
            .store
            .put(STORE_DIR, &upload.name, &upload.data)
            .await
            .map_err(|e| ApiError::FileUploadError(format!("{e:#}")))?;

        Ok((object.url, upload.name.clone(), object.key))
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::file::FsObjectStore;
    use crate::user::{CreateUser, UserRepository, UserRole};

    async fn fixture() -> (PostService, User, User, tempfile::TempDir) {
        let db = Database::in_memory().await.unwrap();
        let users = UserRepository::new(db.pool().clone());
        let mut created = Vec::new();
        for email in ["a@b.com", "c@d.com"] {
            created.push(
                users
                    .create(CreateUser {
                        email: email.to_string(),
                        username: format!("user-{email}"),
                        password_hash: None,
                        role: UserRole::User,
                        provider: None,
                    })
                    .await
                    .unwrap(),
            );
        }

        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FsObjectStore::new(tmp.path(), "/uploads"));
        let service = PostService::new(PostRepository::new(db.pool().clone()), store);

        let other = created.pop().unwrap();
        let author = created.pop().unwrap();
        (service, author, other, tmp)
    }

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            writer: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (service, author, _, _tmp) = fixture().await;

        let post = service
            .create(PostDraft::default(), None, &author)
            .await
            .unwrap();

        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.content, DEFAULT_CONTENT);
        assert_eq!(post.writer, author.username);
        assert_eq!(post.user_id, Some(author.id));
        assert!(post.file_url.is_none());
    }

    #[tokio::test]
    async fn test_create_with_attachment() {
        let (service, author, _, _tmp) = fixture().await;

        let post = service
            .create(
                draft("hello", "world"),
                Some(AttachmentUpload {
                    name: "chart.png".to_string(),
                    data: vec![1, 2, 3],
                }),
                &author,
            )
            .await
            .unwrap();

        assert_eq!(post.file_name.as_deref(), Some("chart.png"));
        assert!(post.file_key.as_deref().unwrap().starts_with("posts/"));
        assert!(post.file_url.as_deref().unwrap().starts_with("/uploads/posts/"));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let (service, author, _, _tmp) = fixture().await;
        let post = service
            .create(draft("original", "body"), None, &author)
            .await
            .unwrap();

        let updated = service
            .update(
                post.id,
                PostDraft {
                    title: Some("changed".to_string()),
                    content: None,
                    writer: None,
                },
                None,
                &author,
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "changed");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.writer, post.writer);
    }

    #[tokio::test]
    async fn test_update_denied_for_non_owner() {
        let (service, author, other, _tmp) = fixture().await;
        let post = service
            .create(draft("mine", "body"), None, &author)
            .await
            .unwrap();

        let err = service
            .update(post.id, draft("stolen", "body"), None, &other)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotPostOwner));

        let err = service.delete(post.id, &other).await.unwrap_err();
        assert!(matches!(err, ApiError::NotPostOwner));
    }

    #[tokio::test]
    async fn test_delete_removes_post() {
        let (service, author, _, _tmp) = fixture().await;
        let post = service
            .create(draft("bye", "now"), None, &author)
            .await
            .unwrap();

        service.delete(post.id, &author).await.unwrap();
        let err = service.find_by_id(post.id).await.unwrap_err();
        assert!(matches!(err, ApiError::PostNotFound));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (service, author, _, _tmp) = fixture().await;
        service.create(draft("first", "1"), None, &author).await.unwrap();
        service.create(draft("second", "2"), None, &author).await.unwrap();

        let posts = service.list_all().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "second");
        assert_eq!(posts[1].title, "first");
    }
}
