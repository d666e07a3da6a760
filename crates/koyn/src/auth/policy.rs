//! Path access policy.
//!
//! One canonical table decides which request paths require identity. The
//! table is built once at startup and never mutated afterwards.

/// Access requirement for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity required; the auth middleware skips the path entirely.
    Public,
    /// Identity required; enforced by the per-route decision point.
    Authenticated,
}

/// A single prefix rule.
#[derive(Debug, Clone)]
pub struct PathRule {
    prefix: String,
    access: Access,
}

impl PathRule {
    pub fn public(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            access: Access::Public,
        }
    }

    pub fn authenticated(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            access: Access::Authenticated,
        }
    }
}

/// Ordered prefix table mapping request paths to an [`Access`] decision.
///
/// Evaluation is a single linear scan; the first matching prefix wins, so
/// more specific rules must come first. Paths matching no rule are
/// `Authenticated` — the table fails closed.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    rules: Vec<PathRule>,
}

/// Prefixes that never require identity.
const BUILTIN_PUBLIC: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/signup",
    "/oauth2/",
    "/docs",
    "/uploads/",
];

impl PathPolicy {
    /// Build the policy table: built-in public prefixes plus any extras
    /// from configuration.
    pub fn new(extra_public: &[String]) -> Self {
        let rules = BUILTIN_PUBLIC
            .iter()
            .map(|p| PathRule::public(*p))
            .chain(extra_public.iter().map(PathRule::public))
            .collect();

        Self { rules }
    }

    /// Prepend a rule, giving it priority over the existing table.
    pub fn with_rule(mut self, rule: PathRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// Classify a request path. Total: every path gets exactly one answer.
    pub fn decision(&self, path: &str) -> Access {
        for rule in &self.rules {
            if path.starts_with(&rule.prefix) {
                return rule.access;
            }
        }
        Access::Authenticated
    }
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}
