//! Authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::resolver::ResolveError;
use super::{
    Access, AuthError, Identity, IdentityResolver, PathPolicy, ROLE_ADMIN, TokenCodec, TokenError,
};

/// Extract the bearer credential from an Authorization header value.
///
/// The scheme is the literal `Bearer ` prefix; a missing header, another
/// scheme, or an empty remainder all count as "no token".
fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Gatekeeper state shared across requests.
///
/// Everything in here is immutable after startup; concurrent requests share
/// it behind `Arc`s without locking.
#[derive(Clone)]
pub struct AuthState {
    codec: Arc<TokenCodec>,
    policy: Arc<PathPolicy>,
    resolver: Arc<IdentityResolver>,
}

impl AuthState {
    pub fn new(
        codec: Arc<TokenCodec>,
        policy: Arc<PathPolicy>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            codec,
            policy,
            resolver,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }
}

/// Authenticated caller, taken from request extensions.
///
/// Declaring this extractor on a handler is the route's authorization
/// decision point: reaching a protected handler without an identity is
/// rejected with 401 `C001` before the handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.identity.subject_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn is_admin(&self) -> bool {
        self.identity.roles.iter().any(|r| r == ROLE_ADMIN)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

/// Per-request gatekeeper.
///
/// Four outcomes per request:
/// - pre-flight (OPTIONS) and public paths are skipped — no identity set,
///   whatever the Authorization header contains;
/// - no credential: pass through unauthenticated, the decision point
///   rejects later if the route needs identity;
/// - a credential that fails verification terminates the request here with
///   401 `C001`, the handler never runs;
/// - a verified credential resolves to an identity inserted into the
///   request extensions. Resolution failures are logged and degrade to
///   unauthenticated pass-through — the pipeline never crashes on them.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS || auth.policy.decision(req.uri().path()) == Access::Public
    {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    let Some(token) = token else {
        return next.run(req).await;
    };

    let claims = match auth.codec.verify(&token) {
        Ok(claims) => claims,
        Err(err) => {
            // Expired is routine churn; forged or mangled tokens are worth
            // a warning. The response is identical either way.
            match err {
                TokenError::Expired => debug!(uri = %req.uri(), "rejected expired credential"),
                _ => warn!(uri = %req.uri(), "rejected credential: {err}"),
            }
            return AuthError::InvalidToken.into_response();
        }
    };

    match auth.resolver.resolve(&claims).await {
        Ok(identity) => {
            debug!(subject = identity.subject_id, uri = %req.uri(), "request identified");
            req.extensions_mut().insert(CurrentUser { identity });
            next.run(req).await
        }
        Err(err) => {
            match &err {
                ResolveError::IdentityNotFound(_) => {
                    warn!(uri = %req.uri(), "identity resolution failed: {err}");
                }
                ResolveError::UpstreamLookupTimeout | ResolveError::Store(_) => {
                    error!(uri = %req.uri(), "identity resolution failed: {err}");
                }
            }
            next.run(req).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_valid() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer  padded "), Some("padded"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme_is_no_token() {
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Token abc"), None);
    }

    #[test]
    fn test_bearer_token_empty_is_no_token() {
        assert_eq!(bearer_token(""), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
    }
}
