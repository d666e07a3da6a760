//! File upload and lifecycle.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{CreateFile, StoredFile};
use super::repository::FileRepository;
use super::store::ObjectStore;
use crate::api::{ApiError, ApiResult};
use crate::auth::Identity;

const STORE_DIR: &str = "files";

/// Service for standalone file uploads.
#[derive(Clone)]
pub struct FileService {
    repo: FileRepository,
    store: Arc<dyn ObjectStore>,
}

impl FileService {
    pub fn new(repo: FileRepository, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// Store the uploaded bytes and record the metadata row.
    #[instrument(skip(self, data, identity), fields(name = %original_name, size = data.len()))]
    pub async fn upload(
        &self,
        original_name: &str,
        content_type: Option<String>,
        data: Vec<u8>,
        identity: &Identity,
    ) -> ApiResult<StoredFile> {
        let object = self
            .store
            .put(STORE_DIR, original_name, &data)
            .await
            .map_err(|e| ApiError::FileUploadError(format!("{e:#}")))?;

        let stored_name = object
            .key
            .rsplit('/')
            .next()
            .unwrap_or(&object.key)
            .to_string();

        // Fall back to a guess from the name when the client sent no type.
        let content_type = content_type.or_else(|| {
            mime_guess::from_path(original_name)
                .first()
                .map(|m| m.essence_str().to_string())
        });

        let file = self
            .repo
            .create(CreateFile {
                original_name: original_name.to_string(),
                stored_name,
                url: object.url,
                content_type,
                size: data.len() as i64,
                user_id: identity.subject_id,
            })
            .await?;

        debug!(file_id = file.id, "file uploaded");
        Ok(file)
    }

    /// Fetch one file's metadata.
    pub async fn find_by_id(&self, id: i64) -> ApiResult<StoredFile> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::FileNotFound)
    }

    /// List the caller's files, newest first.
    pub async fn list_for(&self, identity: &Identity) -> ApiResult<Vec<StoredFile>> {
        Ok(self.repo.list_by_user(identity.subject_id).await?)
    }

    /// Delete a file the caller owns, object first, then the row.
    #[instrument(skip(self, identity))]
    pub async fn delete(&self, id: i64, identity: &Identity) -> ApiResult<()> {
        let file = self.find_by_id(id).await?;

        if file.user_id != identity.subject_id {
            warn!(file_id = id, subject = identity.subject_id, "file delete denied");
            return Err(ApiError::AccessDenied);
        }

        self.store
            .delete(&format!("{STORE_DIR}/{}", file.stored_name))
            .await
            .map_err(|e| ApiError::FileDeleteError(format!("{e:#}")))?;

        self.repo.delete(id).await?;
        debug!(file_id = id, "file deleted");
        Ok(())
    }

    /// Read raw object bytes for serving. Key is store-relative.
    pub async fn read_object(&self, key: &str) -> ApiResult<Vec<u8>> {
        self.store
            .get(key)
            .await
            .map_err(|e| ApiError::internal(format!("{e:#}")))?
            .ok_or(ApiError::FileNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::file::store::FsObjectStore;
    use crate::user::{CreateUser, UserRepository, UserRole};

    async fn fixture() -> (FileService, Identity, Identity, tempfile::TempDir) {
        let db = Database::in_memory().await.unwrap();
        let users = UserRepository::new(db.pool().clone());
        let mut identities = Vec::new();
        for email in ["a@b.com", "c@d.com"] {
            let user = users
                .create(CreateUser {
                    email: email.to_string(),
                    username: email.to_string(),
                    password_hash: None,
                    role: UserRole::User,
                    provider: None,
                })
                .await
                .unwrap();
            identities.push(Identity {
                subject_id: user.id,
                email: user.email,
                roles: vec![UserRole::User.to_string()],
            });
        }

        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FsObjectStore::new(tmp.path(), "/uploads"));
        let service = FileService::new(FileRepository::new(db.pool().clone()), store);

        let second = identities.pop().unwrap();
        let first = identities.pop().unwrap();
        (service, first, second, tmp)
    }

    #[tokio::test]
    async fn test_upload_records_metadata() {
        let (service, owner, _, _tmp) = fixture().await;

        let file = service
            .upload("notes.txt", None, b"hello".to_vec(), &owner)
            .await
            .unwrap();

        assert_eq!(file.original_name, "notes.txt");
        assert_eq!(file.size, 5);
        assert_eq!(file.user_id, owner.subject_id);
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert!(file.url.starts_with("/uploads/files/"));

        let listed = service.list_for(&owner).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let (service, owner, other, _tmp) = fixture().await;
        let file = service
            .upload("notes.txt", None, b"hello".to_vec(), &owner)
            .await
            .unwrap();

        let err = service.delete(file.id, &other).await.unwrap_err();
        assert!(matches!(err, ApiError::AccessDenied));

        service.delete(file.id, &owner).await.unwrap();
        let err = service.find_by_id(file.id).await.unwrap_err();
        assert!(matches!(err, ApiError::FileNotFound));
    }

    #[tokio::test]
    async fn test_read_object_round_trip() {
        let (service, owner, _, _tmp) = fixture().await;
        let file = service
            .upload("notes.txt", None, b"hello".to_vec(), &owner)
            .await
            .unwrap();

        let bytes = service
            .read_object(&format!("files/{}", file.stored_name))
            .await
            .unwrap();
        assert_eq!(bytes, b"hello");
    }
}
