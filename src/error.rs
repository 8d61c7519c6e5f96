//! Error types for the Smart Cache Gateway
//!
//! Provides structured error types for the cache subsystem, the remote
//! store adapter, and the REST API layer.

use thiserror::Error;

/// Unified error type for the gateway
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Remote Store Errors
    // =========================================================================
    #[error("Store transport error: {0}")]
    StoreTransport(#[from] reqwest::Error),

    #[error("Store response error: {0}")]
    StoreResponse(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is transient
    ///
    /// Transient errors are expected to clear on their own; the cache layer
    /// absorbs them as misses rather than retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::StoreTransport(_) | Error::Io(_))
    }
}

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let config_err = Error::Configuration("invalid".into());
        assert!(!config_err.is_transient());

        let response_err = Error::StoreResponse("unexpected shape".into());
        assert!(!response_err.is_transient());

        let io_err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(io_err.is_transient());
    }
}
