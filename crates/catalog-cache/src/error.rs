//! Error types for the catalog cache.
//!
//! Absence is never an error here: lookups return `Option` and invalidations
//! return `bool`. The variants below are the conditions a caller has to react to.

use thiserror::Error;

/// Main error type for the catalog cache.
#[derive(Debug, Error)]
pub enum CacheError {
    // Key errors
    #[error("Malformed cache key {key:?}: expected {expected} components, got {actual}")]
    MalformedKey {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid identifier component {component:?}: {message}")]
    InvalidIdentifier { component: String, message: String },

    // Internal consistency errors
    #[error("Dangling storage layout reference {hash} held by {entity}")]
    DanglingLayout { entity: String, hash: String },

    // Listing errors
    #[error("Invalid name pattern {pattern:?} at alternative {alternative:?}: {message}")]
    InvalidPattern {
        pattern: String,
        alternative: String,
        message: String,
        #[source]
        source: Option<regex::Error>,
    },

    // Lifecycle errors
    #[error("Cache has been shut down")]
    ShutDown,
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    /// Build an invalid-pattern error from a failed regex compilation.
    pub fn invalid_pattern(
        pattern: impl Into<String>,
        alternative: impl Into<String>,
        err: regex::Error,
    ) -> Self {
        CacheError::InvalidPattern {
            pattern: pattern.into(),
            alternative: alternative.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Convert to a JSON-RPC error code for the service layer.
    ///
    /// - -32005: Validation error (bad pattern or identifier)
    /// - -32006: Service unavailable (cache shut down)
    /// - -32603: Internal error (malformed key, dangling reference)
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            CacheError::InvalidPattern { .. } | CacheError::InvalidIdentifier { .. } => -32005,
            CacheError::ShutDown => -32006,
            CacheError::MalformedKey { .. } | CacheError::DanglingLayout { .. } => -32603,
        }
    }

    /// Whether this error indicates a programming or cache-corruption fault
    /// rather than bad caller input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CacheError::MalformedKey { .. } | CacheError::DanglingLayout { .. }
        )
    }
}
