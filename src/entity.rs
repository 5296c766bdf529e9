//! Trait for entities that can be written to the cache.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

/// Trait that all entities stored in cache must implement.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use bookcache::CacheEntity;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Shelf {
///     pub id: u32,
///     pub label: String,
/// }
///
/// impl CacheEntity for Shelf {
///     type Key = u32;
///
///     fn cache_key(&self) -> Self::Key {
///         self.id
///     }
///
///     fn cache_prefix() -> &'static str {
///         "shelf"
///     }
/// }
/// ```
pub trait CacheEntity: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Type of the entity's id
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Return the entity's unique cache key.
    fn cache_key(&self) -> Self::Key;

    /// Namespace for keys of this entity type.
    ///
    /// Final cache key format: `"{prefix}:{key}"`
    fn cache_prefix() -> &'static str;

    /// Serialize entity for cache storage (versioned postcard envelope).
    ///
    /// See `crate::serialization` for the format.
    fn serialize_for_cache(&self) -> Result<Vec<u8>> {
        crate::serialization::serialize_for_cache(self)
    }

    /// Deserialize entity from cache storage, validating magic and version.
    ///
    /// # Errors
    ///
    /// - `Error::CacheEntry`: Bad magic or corrupted envelope
    /// - `Error::VersionMismatch`: Schema version changed
    fn deserialize_from_cache(bytes: &[u8]) -> Result<Self> {
        crate::serialization::deserialize_from_cache(bytes)
    }
}
