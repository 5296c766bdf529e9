//! Cache backend implementations.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

#[cfg(feature = "inmemory")]
pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis::{PoolStats, RedisBackend, RedisConfig};

/// Trait for cache backend implementations.
///
/// The cache is a best-effort accelerator, never the source of truth. A
/// backend reports a clean miss as `Ok(None)` and reserves `Err` for the
/// backend itself failing, so callers can tell the two apart.
///
/// All methods take `&self`; implementations use interior mutability or an
/// external store. Returned futures are `Send` so the HTTP layer can stay
/// generic over the backend. Implementors may write plain `async fn`.
pub trait CacheBackend: Send + Sync + Clone + 'static {
    /// Retrieve value from cache by key.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value found in cache
    /// - `Ok(None)` - Cache miss (key absent or expired)
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails (connection lost, etc.)
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store value in cache. `ttl = None` keeps the entry until deleted.
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove value from cache. Removing an absent key succeeds.
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if key exists in cache.
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.get(key).await?.is_some()) }
    }

    /// Bulk delete. Default implementation calls `delete()` for each key;
    /// override for a single round trip (e.g. Redis `DEL k1 k2`).
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails
    fn mdelete(&self, keys: &[&str]) -> impl Future<Output = Result<()>> + Send {
        async move {
            for key in keys {
                self.delete(key).await?;
            }
            Ok(())
        }
    }

    /// Drop every entry. Used by tests and operator tooling, never by the
    /// request path.
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend fails
    fn clear_all(&self) -> impl Future<Output = Result<()>> + Send;

    /// Health check used by the readiness endpoint.
    ///
    /// # Errors
    /// Returns `Error::Cache` if the backend is not reachable
    fn health_check(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }
}
