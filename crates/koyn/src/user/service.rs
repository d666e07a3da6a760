//! User signup, login and lookup.

use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use super::models::{CreateUser, LoginRequest, SignupRequest, User, UserRole};
use super::repository::UserRepository;
use crate::api::{ApiError, ApiResult};
use crate::oauth::OAuthProfile;

/// Service for account management.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Register a new account with a bcrypt-hashed password.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> ApiResult<User> {
        validate_signup(&request)?;

        if self.repo.exists_by_email(&request.email).await? {
            return Err(ApiError::EmailDuplicated);
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::internal(format!("hashing password: {e}")))?;

        let user = self
            .repo
            .create(CreateUser {
                email: request.email,
                username: request.username,
                password_hash: Some(password_hash),
                role: UserRole::User,
                provider: None,
            })
            .await?;

        debug!(user_id = user.id, "account created");
        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// Every failure is the same `LoginFailed`: whether the account exists
    /// is not revealed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ApiResult<User> {
        let user = self
            .repo
            .find_by_email(&request.email)
            .await?
            .ok_or(ApiError::LoginFailed)?;

        // OAuth-only accounts have no password to check against.
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(ApiError::LoginFailed);
        };

        let matches = bcrypt::verify(&request.password, hash)
            .map_err(|e| ApiError::internal(format!("verifying password: {e}")))?;
        if !matches {
            warn!(user_id = user.id, "login rejected: bad password");
            return Err(ApiError::LoginFailed);
        }

        Ok(user)
    }

    /// Look up a user by id.
    pub async fn find_by_id(&self, id: i64) -> ApiResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    /// Look up a user by email.
    pub async fn find_by_email(&self, email: &str) -> ApiResult<User> {
        self.repo
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    /// Find or create the account backing an OAuth profile.
    #[instrument(skip(self, profile), fields(provider = %profile.provider))]
    pub async fn upsert_oauth(&self, profile: OAuthProfile) -> ApiResult<User> {
        if let Some(existing) = self.repo.find_by_email(&profile.email).await? {
            return Ok(existing);
        }

        let user = self
            .repo
            .create(CreateUser {
                email: profile.email,
                username: profile.name,
                password_hash: None,
                role: UserRole::User,
                provider: Some(profile.provider),
            })
            .await?;

        debug!(user_id = user.id, "oauth account created");
        Ok(user)
    }
}

fn validate_signup(request: &SignupRequest) -> ApiResult<()> {
    let mut errors = BTreeMap::new();

    if request.email.trim().is_empty() || !request.email.contains('@') {
        errors.insert("email".to_string(), "must be a valid email".to_string());
    }
    if request.password.len() < 8 {
        errors.insert(
            "password".to_string(),
            "must be at least 8 characters".to_string(),
        );
    }
    if request.username.trim().is_empty() {
        errors.insert("username".to_string(), "must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn service() -> UserService {
        let db = Database::in_memory().await.unwrap();
        UserService::new(UserRepository::new(db.pool().clone()))
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            username: "someone".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let service = service().await;
        let user = service.signup(signup_request("a@b.com")).await.unwrap();
        assert_eq!(user.role, UserRole::User);

        let logged_in = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let service = service().await;
        service.signup(signup_request("a@b.com")).await.unwrap();

        let err = service.signup(signup_request("a@b.com")).await.unwrap_err();
        assert!(matches!(err, ApiError::EmailDuplicated));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let service = service().await;
        let err = service
            .signup(SignupRequest {
                email: "not-an-email".to_string(),
                password: "short".to_string(),
                username: "".to_string(),
            })
            .await
            .unwrap_err();

        let ApiError::InvalidInput(errors) = err else {
            panic!("expected InvalidInput");
        };
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service().await;
        service.signup(signup_request("a@b.com")).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed));
    }

    #[tokio::test]
    async fn test_login_unknown_email_same_error() {
        let service = service().await;
        let err = service
            .login(LoginRequest {
                email: "ghost@b.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed));
    }

    #[tokio::test]
    async fn test_upsert_oauth_reuses_account() {
        let service = service().await;
        let first = service
            .upsert_oauth(OAuthProfile {
                email: "k@koyn.local".to_string(),
                name: "K".to_string(),
                provider: "kakao".to_string(),
            })
            .await
            .unwrap();

        let second = service
            .upsert_oauth(OAuthProfile {
                email: "k@koyn.local".to_string(),
                name: "K again".to_string(),
                provider: "kakao".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
    }
}
