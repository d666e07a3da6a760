//! Identity resolution.

use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use super::Claims;
use crate::user::UserRepository;

/// Request-scoped identity: who is making this request.
///
/// Built fresh per request from verified claims plus a user-store lookup;
/// owned by the request's execution context and discarded at request end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: i64,
    pub email: String,
    pub roles: Vec<String>,
}

/// Resolution failures. All of them degrade the request to unauthenticated
/// instead of terminating it; the decision point has the final word.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The token references a subject that no longer exists.
    #[error("subject {0} no longer exists")]
    IdentityNotFound(i64),

    /// The user store did not answer within the lookup deadline.
    #[error("user store lookup timed out")]
    UpstreamLookupTimeout,

    /// The user store answered with a failure.
    #[error("user store lookup failed: {0}")]
    Store(String),
}

/// Maps verified claims to a full [`Identity`].
///
/// The subject is re-confirmed against the user store on every request so a
/// token cannot outlive a deleted account, and the roles reflect the store
/// rather than the claims — a role change takes effect without waiting for
/// the token to expire.
pub struct IdentityResolver {
    users: UserRepository,
    lookup_timeout: Duration,
}

impl IdentityResolver {
    pub fn new(users: UserRepository, lookup_timeout: Duration) -> Self {
        Self {
            users,
            lookup_timeout,
        }
    }

    /// Resolve verified claims. The lookup is bounded; a slow store yields
    /// `UpstreamLookupTimeout` instead of hanging the request.
    pub async fn resolve(&self, claims: &Claims) -> Result<Identity, ResolveError> {
        let lookup = self.users.find_by_id(claims.user_id);

        let user = match timeout(self.lookup_timeout, lookup).await {
            Err(_) => return Err(ResolveError::UpstreamLookupTimeout),
            Ok(Err(e)) => return Err(ResolveError::Store(format!("{e:#}"))),
            Ok(Ok(None)) => return Err(ResolveError::IdentityNotFound(claims.user_id)),
            Ok(Ok(Some(user))) => user,
        };

        Ok(Identity {
            subject_id: user.id,
            email: user.email,
            roles: vec![user.role.to_string()],
        })
    }
}
