//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ErrorResponse;

/// Failures produced by the gatekeeper and the per-route decision point.
///
/// All three serialize to the shared structured body. A rejected credential
/// and an absent one get the same `C001` code on purpose: the response does
/// not reveal why authentication failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// A credential was presented and failed verification.
    #[error("Invalid token")]
    InvalidToken,

    /// A protected route was reached without an identity.
    #[error("Unauthorized access")]
    Unauthorized,

    /// An identity was present but insufficient for the route.
    #[error("Access denied")]
    AccessDenied,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken | AuthError::Unauthorized => "C001",
            AuthError::AccessDenied => "C002",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(status, self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_codes_do_not_distinguish_auth_failures() {
        assert_eq!(AuthError::InvalidToken.code(), "C001");
        assert_eq!(AuthError::Unauthorized.code(), "C001");
        assert_eq!(AuthError::AccessDenied.code(), "C002");
    }
}
