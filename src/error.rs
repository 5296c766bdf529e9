//! Error types for the book service.

use crate::model::BookId;
use thiserror::Error;

/// Result type for service, store and cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of failure kinds.
///
/// Callers branch on the variant, never on the message. The HTTP layer maps
/// each variant to one status code (see `http::error`).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed or out-of-range client input.
    ///
    /// Raised for non-numeric or non-positive ids and for request bodies that
    /// fail to decode. The operation never reaches the store.
    #[error("Invalid input: {0}")]
    ClientInput(String),

    /// No row exists for the requested id.
    #[error("Book {id} not found")]
    NotFound {
        /// The id that was looked up
        id: BookId,
    },

    /// Relational store failure (connection lost, query error, pool timeout).
    ///
    /// **Recovery:** the operation was aborted; no partial mutation is assumed.
    #[error("Store error: {0}")]
    Store(String),

    /// Cache backend failure (Redis unavailable, network timeout, protocol error).
    ///
    /// Only fatal on the list read-check under `CacheReadPolicy::FailFast`.
    /// Everywhere else the service logs it and carries on.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Encoding a value for cache storage failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cache entry could not be decoded: bad magic, truncated envelope or
    /// corrupt payload.
    ///
    /// **Recovery:** evict the entry and recompute from the store.
    #[error("Invalid cache entry: {0}")]
    CacheEntry(String),

    /// Cache entry was written by a different schema version.
    ///
    /// Expected during deployments that change `Book`. The entry is evicted
    /// and recomputed on next access.
    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// Invalid startup configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures that mean "this cache entry is unusable", as opposed
    /// to "the cache is unreachable".
    pub fn is_bad_cache_entry(&self) -> bool {
        matches!(self, Error::CacheEntry(_) | Error::VersionMismatch { .. })
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::Cache(format!("Redis error: {}", e))
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Store(e.to_string())
    }
}
