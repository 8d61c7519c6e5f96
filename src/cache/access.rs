//! Cache Access Validation
//!
//! The single chokepoint for per-key access control. Every read and write
//! that reaches the remote store first passes through [`AccessValidator`];
//! tightening the policy here never requires touching call sites.

use tracing::debug;

// =============================================================================
// Permissions
// =============================================================================

/// Permissions a caller may hold when touching the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Caller has presented a verified identity token
    Authenticated,
}

/// Permission set required for the standard smart-cache paths
pub const REQUIRED_PERMISSIONS: &[Permission] = &[Permission::Authenticated];

// =============================================================================
// Access Validator
// =============================================================================

/// Decides whether a cache key may be read or written under a permission set
///
/// Current rule: access is granted iff the permission set contains
/// [`Permission::Authenticated`] and the key is a non-empty string. This is
/// the minimum viable policy and is expected to grow.
#[derive(Debug, Clone, Default)]
pub struct AccessValidator;

impl AccessValidator {
    /// Create a validator
    pub fn new() -> Self {
        Self
    }

    /// Validate access to `key` under `granted` permissions
    pub fn validate(&self, key: &str, granted: &[Permission]) -> bool {
        if key.is_empty() {
            debug!("Cache access denied: empty key");
            return false;
        }

        if !granted.contains(&Permission::Authenticated) {
            debug!(key = key, "Cache access denied: not authenticated");
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grants_authenticated_nonempty_key() {
        let validator = AccessValidator::new();
        assert!(validator.validate("geo_search:tirana", REQUIRED_PERMISSIONS));
    }

    #[test]
    fn test_denies_empty_key() {
        let validator = AccessValidator::new();
        assert!(!validator.validate("", REQUIRED_PERMISSIONS));
    }

    #[test]
    fn test_denies_unauthenticated() {
        let validator = AccessValidator::new();
        assert!(!validator.validate("geo_search:tirana", &[]));
    }
}
