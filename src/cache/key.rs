//! Structured Cache Keys
//!
//! Canonical key construction for all cache call sites. A key is globally
//! unique across the whole gateway only by convention: every parameter that
//! affects a response must be embedded into the key. Building keys through
//! this module keeps parameter ordering and formatting consistent, so two
//! call sites caching the same logical result cannot silently diverge.

use std::fmt;

// =============================================================================
// Key Parameters
// =============================================================================

/// A value that can be embedded into a cache key segment
///
/// Implementations must be deterministic: equal inputs always produce the
/// same segment string.
pub trait KeyParam {
    /// Render this value as a canonical key segment
    fn to_key_segment(&self) -> String;
}

impl KeyParam for &str {
    fn to_key_segment(&self) -> String {
        self.trim().to_lowercase()
    }
}

impl KeyParam for String {
    fn to_key_segment(&self) -> String {
        self.as_str().to_key_segment()
    }
}

impl KeyParam for u32 {
    fn to_key_segment(&self) -> String {
        self.to_string()
    }
}

impl KeyParam for u64 {
    fn to_key_segment(&self) -> String {
        self.to_string()
    }
}

impl KeyParam for i64 {
    fn to_key_segment(&self) -> String {
        self.to_string()
    }
}

impl KeyParam for f64 {
    /// Fixed four-decimal rendering so coordinates hash identically
    /// regardless of the source float's precision.
    fn to_key_segment(&self) -> String {
        format!("{:.4}", self)
    }
}

impl KeyParam for bool {
    fn to_key_segment(&self) -> String {
        self.to_string()
    }
}

impl<T: KeyParam> KeyParam for Option<T> {
    fn to_key_segment(&self) -> String {
        match self {
            Some(value) => value.to_key_segment(),
            None => "-".to_string(),
        }
    }
}

// =============================================================================
// Cache Key Builder
// =============================================================================

/// Builder for canonical cache key strings
///
/// Produces `namespace:param1:param2:...` with each parameter rendered
/// through [`KeyParam`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    namespace: String,
    params: Vec<String>,
}

impl CacheKey {
    /// Start a key in the given logical namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            params: Vec::new(),
        }
    }

    /// Append a typed parameter segment
    pub fn param(mut self, value: impl KeyParam) -> Self {
        self.params.push(value.to_key_segment());
        self
    }

    /// Produce the canonical key string
    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.namespace.clone();
        }
        let mut key = String::with_capacity(
            self.namespace.len() + self.params.iter().map(|p| p.len() + 1).sum::<usize>(),
        );
        key.push_str(&self.namespace);
        for param in &self.params {
            key.push(':');
            key.push_str(param);
        }
        key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}
