//! Book service: the cache-aside protocol over a store and a cache backend.
//!
//! # Protocol
//!
//! | Operation | Store | Cache |
//! |-----------|-------|-------|
//! | `create`  | insert | delete `books_list` |
//! | `get`     | select by id | not consulted |
//! | `list`    | select all, on miss only | read `books_list`; on miss set it with the list TTL |
//! | `update`  | select, merge, update | delete `book:{id}` and `books_list` |
//! | `delete`  | delete | delete `book:{id}` and `books_list` |
//!
//! Invalidation and population are best-effort: the store write has already
//! committed, so a cache failure there is logged and recorded, never returned.
//! The only cache failure a caller can see is a backend error on the list
//! read-check under [`CacheReadPolicy::FailFast`].
//!
//! There is no locking. A `list` racing an `update` can repopulate
//! `books_list` from a snapshot taken before the update committed; that entry
//! lives at most one list TTL.

use crate::backend::CacheBackend;
use crate::error::{Error, Result};
use crate::key::{CacheKeyBuilder, BOOKS_LIST_KEY};
use crate::model::{Book, BookId, BookPatch, NewBook};
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::policy::{CacheReadPolicy, CacheStatus};
use crate::serialization::{deserialize_from_cache, serialize_for_cache};
use crate::store::BookStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time-to-live of the `books_list` entry.
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(300);

/// Tuning for [`BookService`], built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// TTL of the `books_list` entry.
    pub list_ttl: Duration,
    /// Behaviour when the list read-check hits a backend error.
    pub cache_read_policy: CacheReadPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            list_ttl: DEFAULT_LIST_TTL,
            cache_read_policy: CacheReadPolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    pub fn with_cache_read_policy(mut self, policy: CacheReadPolicy) -> Self {
        self.cache_read_policy = policy;
        self
    }
}

/// Result of [`BookService::list`].
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub books: Vec<Book>,
    /// Whether the list came from the cache.
    pub cache: CacheStatus,
}

/// Reachability of the two adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    pub store: bool,
    pub cache: bool,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.store && self.cache
    }
}

struct Inner<S, B> {
    store: S,
    backend: B,
    config: ServiceConfig,
    metrics: Arc<dyn CacheMetrics>,
}

/// Cache-aside service for books.
///
/// Cloning is cheap (one `Arc`), so one instance is shared by every request
/// handler.
///
/// # Example
///
/// ```ignore
/// use bookcache::{BookService, ServiceConfig, NewBook};
/// use bookcache::backend::InMemoryBackend;
/// use bookcache::store::InMemoryStore;
///
/// let service = BookService::new(InMemoryStore::new(), InMemoryBackend::new(), ServiceConfig::default());
/// let dune = service.create(NewBook::new("Dune", "Herbert")).await?;
/// let listing = service.list().await?;   // MISS, populates books_list
/// let listing = service.list().await?;   // HIT
/// ```
pub struct BookService<S, B> {
    inner: Arc<Inner<S, B>>,
}

impl<S, B> Clone for BookService<S, B> {
    fn clone(&self) -> Self {
        BookService {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BookStore, B: CacheBackend> BookService<S, B> {
    pub fn new(store: S, backend: B, config: ServiceConfig) -> Self {
        Self::with_metrics(store, backend, config, Arc::new(NoOpMetrics))
    }

    /// Create a service that reports cache events to `metrics`.
    pub fn with_metrics(
        store: S,
        backend: B,
        config: ServiceConfig,
        metrics: Arc<dyn CacheMetrics>,
    ) -> Self {
        info!(
            "Book service ready (list TTL {:?}, cache read policy {})",
            config.list_ttl, config.cache_read_policy
        );
        BookService {
            inner: Arc::new(Inner {
                store,
                backend,
                config,
                metrics,
            }),
        }
    }

    /// Insert a book and invalidate the list cache.
    ///
    /// # Errors
    ///
    /// - `Error::Store`: the insert failed; nothing was cached
    pub async fn create(&self, book: NewBook) -> Result<Book> {
        let created = self.inner.store.insert(&book, Utc::now()).await?;
        info!("Book {} created ({:?} by {:?})", created.id, created.title, created.author);

        self.invalidate(&[BOOKS_LIST_KEY]).await;
        Ok(created)
    }

    /// Read one book straight from the store.
    ///
    /// Single-row lookups are cheap relative to the full scan behind `list`,
    /// so they are not cached.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: no row for `id`
    /// - `Error::Store`: the query failed
    pub async fn get(&self, id: BookId) -> Result<Book> {
        match self.inner.store.fetch_by_id(id).await? {
            Some(book) => Ok(book),
            None => {
                debug!("Book {} not found", id);
                Err(Error::NotFound { id })
            }
        }
    }

    /// List every book, serving from `books_list` when present.
    ///
    /// An undecodable entry is evicted and treated as a miss. A cache write
    /// failure after a store read is logged; the fresh list is still returned.
    ///
    /// # Errors
    ///
    /// - `Error::Cache`: backend failed on the read-check under
    ///   [`CacheReadPolicy::FailFast`]
    /// - `Error::Store`: the fallthrough query failed
    pub async fn list(&self) -> Result<Listing> {
        let timer = Instant::now();

        if let Some(books) = self.read_cached_list().await? {
            self.inner.metrics.record_hit(BOOKS_LIST_KEY, timer.elapsed());
            info!("Returned {} books from cache", books.len());
            return Ok(Listing {
                books,
                cache: CacheStatus::Hit,
            });
        }
        self.inner.metrics.record_miss(BOOKS_LIST_KEY, timer.elapsed());

        let books = self.inner.store.fetch_all().await?;
        self.populate_list(&books).await;

        info!("Returned {} books from store", books.len());
        Ok(Listing {
            books,
            cache: CacheStatus::Miss,
        })
    }

    /// Merge `patch` into the current row and persist it.
    ///
    /// `updated_at` becomes the current time, or stays put if the stored
    /// value is somehow ahead of this host's clock.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: no row for `id`, or it was deleted mid-update
    /// - `Error::Store`: the read or the write failed
    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Book> {
        let mut book = self.get(id).await?;
        let previous = book.updated_at;

        patch.apply(&mut book);
        book.updated_at = Utc::now().max(previous);

        let updated = self
            .inner
            .store
            .update(&book)
            .await?
            .ok_or(Error::NotFound { id })?;
        info!("Book {} updated", id);

        let book_key = CacheKeyBuilder::build::<Book>(&id);
        self.invalidate(&[book_key.as_str(), BOOKS_LIST_KEY]).await;
        Ok(updated)
    }

    /// Delete a book. Deleting an absent id is not an error.
    ///
    /// # Errors
    ///
    /// - `Error::Store`: the delete failed
    pub async fn delete(&self, id: BookId) -> Result<()> {
        self.inner.store.delete(id).await?;
        info!("Book {} deleted", id);

        let book_key = CacheKeyBuilder::build::<Book>(&id);
        self.invalidate(&[book_key.as_str(), BOOKS_LIST_KEY]).await;
        Ok(())
    }

    /// Probe both adapters concurrently. Errors count as unhealthy.
    pub async fn health(&self) -> Health {
        let (store, cache) = futures::join!(
            self.inner.store.health_check(),
            self.inner.backend.health_check()
        );

        let store = store.unwrap_or_else(|e| {
            warn!("Store health check failed: {}", e);
            false
        });
        let cache = cache.unwrap_or_else(|e| {
            warn!("Cache health check failed: {}", e);
            false
        });
        Health { store, cache }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// `Ok(None)` means "go to the store": a clean miss, an undecodable
    /// entry, or a backend error under `FallBackToStore`.
    async fn read_cached_list(&self) -> Result<Option<Vec<Book>>> {
        let bytes = match self.inner.backend.get(BOOKS_LIST_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.inner.metrics.record_error(BOOKS_LIST_KEY, &e.to_string());
                return match self.inner.config.cache_read_policy {
                    CacheReadPolicy::FailFast => {
                        error!("Failed to read {} from cache: {}", BOOKS_LIST_KEY, e);
                        Err(e)
                    }
                    CacheReadPolicy::FallBackToStore => {
                        warn!(
                            "Failed to read {} from cache, reading from store: {}",
                            BOOKS_LIST_KEY, e
                        );
                        Ok(None)
                    }
                };
            }
        };

        match deserialize_from_cache::<Vec<Book>>(&bytes) {
            Ok(books) => Ok(Some(books)),
            Err(e) => {
                warn!("Discarding unreadable {} entry: {}", BOOKS_LIST_KEY, e);
                self.inner.metrics.record_error(BOOKS_LIST_KEY, &e.to_string());
                self.invalidate(&[BOOKS_LIST_KEY]).await;
                Ok(None)
            }
        }
    }

    async fn populate_list(&self, books: &[Book]) {
        let timer = Instant::now();

        let bytes = match serialize_for_cache(&books) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode {} for cache: {}", BOOKS_LIST_KEY, e);
                self.inner.metrics.record_error(BOOKS_LIST_KEY, &e.to_string());
                return;
            }
        };

        match self
            .inner
            .backend
            .set(BOOKS_LIST_KEY, bytes, Some(self.inner.config.list_ttl))
            .await
        {
            Ok(()) => self.inner.metrics.record_set(BOOKS_LIST_KEY, timer.elapsed()),
            Err(e) => {
                error!("Failed to cache {}: {}", BOOKS_LIST_KEY, e);
                self.inner.metrics.record_error(BOOKS_LIST_KEY, &e.to_string());
            }
        }
    }

    async fn invalidate(&self, keys: &[&str]) {
        let timer = Instant::now();

        match self.inner.backend.mdelete(keys).await {
            Ok(()) => {
                debug!("Invalidated cache keys {:?}", keys);
                for key in keys {
                    self.inner.metrics.record_delete(key, timer.elapsed());
                }
            }
            Err(e) => {
                error!("Failed to invalidate cache keys {:?}: {}", keys, e);
                for key in keys {
                    self.inner.metrics.record_error(key, &e.to_string());
                }
            }
        }
    }
}
