//! Signed credential issuance and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use super::Claims;

/// Typed verification failures.
///
/// `InvalidSignature` and `Malformed` produce identical external responses;
/// the distinction exists for logging only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not parse as a compact JWT.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the signing key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Structurally valid and correctly signed, but past expiry.
    #[error("token expired")]
    Expired,

    /// Issuance failure (never returned by `verify`).
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies HMAC-SHA-256 signed credentials.
///
/// Both keys are derived once from the configured secret and held for the
/// process lifetime. The codec has no other state; verification is a pure
/// function of the token and the keys, so a single instance is shared by
/// every concurrent request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Derive the signing keys from the configured secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a signed credential for a subject.
    pub fn issue(
        &self,
        subject_id: i64,
        email: &str,
        roles: Vec<String>,
        valid_for: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: subject_id,
            email: email.to_string(),
            roles,
            iat: now.timestamp(),
            exp: (now + valid_for).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a credential: structure, signature, then expiry.
    ///
    /// Expiry is checked as `exp <= now` with no leeway. jsonwebtoken's own
    /// exp validation allows a 60 s default leeway, so it is disabled and
    /// the comparison made explicit.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Read the subject id without re-verifying the signature.
    ///
    /// Contract: callers must only pass tokens that a prior `verify`
    /// accepted. This accessor does not validate anything beyond structure.
    pub fn extract_subject_id(&self, token: &str) -> Result<i64, TokenError> {
        self.peek(token).map(|c| c.user_id)
    }

    /// Read the subject email without re-verifying the signature.
    ///
    /// Same contract as [`TokenCodec::extract_subject_id`].
    pub fn extract_email(&self, token: &str) -> Result<String, TokenError> {
        self.peek(token).map(|c| c.email)
    }

    fn peek(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|d| d.claims)
            .map_err(|_| TokenError::Malformed)
    }
}
