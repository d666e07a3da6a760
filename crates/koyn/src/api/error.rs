//! Unified API error handling with structured responses.
//!
//! Every rejection leaving the service is a JSON body of the same shape:
//! `{status, code, message, timestamp}` plus an optional field-error map.
//! Codes are grouped per module: C (common), U (user), P (post), F (file),
//! N (news), E (exchange), O (oauth).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler and service results.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid input value")]
    InvalidInput(BTreeMap<String, String>),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Server error: {0}")]
    Internal(String),

    #[error("Email is duplicated")]
    EmailDuplicated,

    #[error("User not found")]
    UserNotFound,

    #[error("Login failed: invalid credentials")]
    LoginFailed,

    #[error("Post not found")]
    PostNotFound,

    #[error("Not the post owner")]
    NotPostOwner,

    #[error("File upload failed: {0}")]
    FileUploadError(String),

    #[error("File not found")]
    FileNotFound,

    #[error("File delete failed: {0}")]
    FileDeleteError(String),

    #[error("News not found")]
    NewsNotFound,

    #[error("Invalid news category: {0}")]
    InvalidNewsCategory(String),

    #[error("Invalid exchange API keys")]
    InvalidExchangeKeys,

    #[error("Exchange connection failed: {0}")]
    ExchangeConnectionFailed(String),

    #[error("Exchange account not linked")]
    ExchangeNotLinked,

    #[error("OAuth provider request failed: {0}")]
    OAuthProviderError(String),

    #[error("Unsupported OAuth provider: {0}")]
    UnsupportedProvider(String),
}

impl ApiError {
    /// Build an `InvalidInput` error from a single field failure.
    pub fn invalid_field(field: impl Into<String>, problem: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), problem.into());
        Self::InvalidInput(errors)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::LoginFailed => StatusCode::UNAUTHORIZED,
            Self::AccessDenied | Self::NotPostOwner => StatusCode::FORBIDDEN,
            Self::InvalidInput(_)
            | Self::EmailDuplicated
            | Self::InvalidNewsCategory(_)
            | Self::InvalidExchangeKeys
            | Self::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            Self::EntityNotFound(_)
            | Self::UserNotFound
            | Self::PostNotFound
            | Self::FileNotFound
            | Self::NewsNotFound
            | Self::ExchangeNotLinked => StatusCode::NOT_FOUND,
            Self::ExchangeConnectionFailed(_) | Self::OAuthProviderError(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Internal(_) | Self::FileUploadError(_) | Self::FileDeleteError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "C001",
            Self::AccessDenied => "C002",
            Self::InvalidInput(_) => "C003",
            Self::EntityNotFound(_) => "C004",
            Self::Internal(_) => "C005",
            Self::EmailDuplicated => "U001",
            Self::UserNotFound => "U002",
            Self::LoginFailed => "U003",
            Self::PostNotFound => "P001",
            Self::NotPostOwner => "P002",
            Self::FileUploadError(_) => "F001",
            Self::FileNotFound => "F002",
            Self::FileDeleteError(_) => "F003",
            Self::NewsNotFound => "N001",
            Self::InvalidNewsCategory(_) => "N002",
            Self::InvalidExchangeKeys => "E001",
            Self::ExchangeConnectionFailed(_) => "E002",
            Self::ExchangeNotLinked => "E003",
            Self::OAuthProviderError(_) => "O001",
            Self::UnsupportedProvider(_) => "O002",
        }
    }

    /// Body message. 5xx details stay in the logs, not the response.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Server error".to_string(),
            Self::FileUploadError(_) => "File upload failed".to_string(),
            Self::FileDeleteError(_) => "File delete failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    /// Build a body for the given status/code/message triple.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            code,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("request failed: {self}");
        }

        let mut body = ErrorResponse::new(status, self.code(), self.public_message());
        if let ApiError::InvalidInput(errors) = self {
            body = body.with_errors(errors);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_table() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unauthorized.code(), "C001");
        assert_eq!(ApiError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::AccessDenied.code(), "C002");
        assert_eq!(ApiError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PostNotFound.code(), "P001");
        assert_eq!(ApiError::NotPostOwner.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::LoginFailed.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::ExchangeConnectionFailed("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError::Internal("secret diagnostic".to_string());
        assert_eq!(err.public_message(), "Server error");
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse::new(StatusCode::UNAUTHORIZED, "C001", "Unauthorized access");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 401);
        assert_eq!(json["code"], "C001");
        assert_eq!(json["message"], "Unauthorized access");
        assert!(json["timestamp"].is_string());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_invalid_input_carries_field_errors() {
        let err = ApiError::invalid_field("email", "must not be empty");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
