//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateUser, User};

const USER_COLUMNS: &str =
    "id, email, username, password_hash, role, provider, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: CreateUser) -> Result<User> {
        debug!("creating user: {}", user.email);

        let id = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, role, provider)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.provider)
        .execute(&self.pool)
        .await
        .context("inserting user")?
        .last_insert_rowid();

        self.find_by_id(id)
            .await?
            .context("user not found after insert")
    }

    /// Get a user by id.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching user by id")?;

        Ok(user)
    }

    /// Get a user by email.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("fetching user by email")?;

        Ok(user)
    }

    /// Check whether an email is already registered.
    #[instrument(skip(self))]
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .context("counting users by email")?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::user::UserRole;

    fn draft(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            username: "someone".to_string(),
            password_hash: Some("$2b$12$hash".to_string()),
            role: UserRole::User,
            provider: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        let user = repo.create(draft("a@b.com")).await.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role, UserRole::User);
        assert!(!user.created_at.is_empty());

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@b.com");

        let by_email = repo.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_exists_by_email() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        assert!(!repo.exists_by_email("a@b.com").await.unwrap());
        repo.create(draft("a@b.com")).await.unwrap();
        assert!(repo.exists_by_email("a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_schema() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        repo.create(draft("a@b.com")).await.unwrap();
        assert!(repo.create(draft("a@b.com")).await.is_err());
    }
}
