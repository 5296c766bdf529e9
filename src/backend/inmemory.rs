//! In-memory cache backend (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding. Expiry is
//! measured on the tokio clock and enforced on access, so tests can drive it
//! with a paused runtime.

use super::CacheBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        CacheEntry { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Thread-safe in-memory cache backend.
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```no_run
/// use bookcache::backend::{CacheBackend, InMemoryBackend};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///     backend.set("books_list", b"...".to_vec(), Some(Duration::from_secs(300))).await?;
///     assert!(backend.get("books_list").await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, CacheEntry>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included until next access.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                debug!("InMemory GET {} -> HIT", key);
                return Ok(Some(entry.data.clone()));
            }
        }

        // Drop the expired entry, if any. The guard above is released first.
        self.store.remove_if(key, |_, entry| entry.is_expired());
        debug!("InMemory GET {} -> MISS", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.store
            .insert(key.to_string(), CacheEntry::new(value, ttl));

        match ttl {
            Some(d) => debug!("InMemory SET {} (TTL: {:?})", key, d),
            None => debug!("InMemory SET {}", key),
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        debug!("InMemory DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self
            .store
            .get(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn mdelete(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.store.remove(*key);
        }
        debug!("InMemory MDELETE {} keys", keys.len());
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("InMemory cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec(), None)
            .await
            .expect("Failed to set");

        let result = backend.get("key1").await.expect("Failed to get");
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_miss() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.get("nonexistent").await.expect("Failed to get"), None);
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let backend = InMemoryBackend::new();
        backend.delete("never-set").await.expect("Failed to delete");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec(), Some(Duration::from_secs(300)))
            .await
            .expect("Failed to set");

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(backend.get("key1").await.expect("Failed to get").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(backend.get("key1").await.expect("Failed to get").is_none());
        assert!(backend.is_empty(), "expired entry is dropped on access");
    }

    #[tokio::test]
    async fn test_mdelete() {
        let backend = InMemoryBackend::new();
        for key in ["books_list", "book:1", "book:2"] {
            backend
                .set(key, b"x".to_vec(), None)
                .await
                .expect("Failed to set");
        }

        backend
            .mdelete(&["books_list", "book:1"])
            .await
            .expect("Failed to mdelete");

        assert_eq!(backend.len(), 1);
        assert!(backend.exists("book:2").await.expect("Failed to check"));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let backend = InMemoryBackend::new();
        backend.set("a", vec![1], None).await.expect("Failed to set");
        backend.set("b", vec![2], None).await.expect("Failed to set");

        backend.clear_all().await.expect("Failed to clear");
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let backend1 = InMemoryBackend::new();
        backend1
            .set("key", b"value".to_vec(), None)
            .await
            .expect("Failed to set");

        let backend2 = backend1.clone();
        assert_eq!(
            backend2.get("key").await.expect("Failed to get"),
            Some(b"value".to_vec())
        );
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let backend = InMemoryBackend::new();
        let mut handles = vec![];

        for i in 0..10 {
            let b = backend.clone();
            handles.push(tokio::spawn(async move {
                b.set(&format!("book:{}", i), vec![i as u8], None)
                    .await
                    .expect("Failed to set");
            }));
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        assert_eq!(backend.len(), 10);
    }
}
