//! Credential claims.

use serde::{Deserialize, Serialize};

/// Role granted to every signed-up account.
pub const ROLE_USER: &str = "ROLE_USER";

/// Role granted to operator accounts.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Claims carried inside a signed credential.
///
/// The claim set mirrors what the login endpoint knows at issuance time:
/// the subject's numeric id, email and role list, plus the validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id (user primary key).
    pub user_id: i64,

    /// Subject email.
    pub email: String,

    /// Subject roles at issuance time.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expires at (Unix timestamp, seconds).
    pub exp: i64,
}

impl Claims {
    /// Check whether a role is present in the claim set.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check whether the claims carry the admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: Vec<&str>) -> Claims {
        Claims {
            user_id: 1,
            email: "a@b.com".to_string(),
            roles: roles.into_iter().map(String::from).collect(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_has_role() {
        let c = claims(vec![ROLE_USER]);
        assert!(c.has_role(ROLE_USER));
        assert!(!c.has_role(ROLE_ADMIN));
        assert!(!c.is_admin());
    }

    #[test]
    fn test_is_admin() {
        let c = claims(vec![ROLE_USER, ROLE_ADMIN]);
        assert!(c.is_admin());
    }
}
