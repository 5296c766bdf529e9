//! Relational store abstraction for books.
//!
//! The store is the single source of truth. It knows nothing about the cache;
//! `BookService` owns every cache decision.
//!
//! # Implementing BookStore
//!
//! Return `Ok(None)` for "no such row" and reserve `Err(Error::Store)` for the
//! store itself failing, so the service can tell a 404 from a 500:
//!
//! ```ignore
//! impl BookStore for MyStore {
//!     async fn fetch_by_id(&self, id: BookId) -> Result<Option<Book>> {
//!         self.client.get(id.get()).await.map_err(|e| Error::Store(e.to_string()))
//!     }
//!     // ...
//! }
//! ```

use crate::error::Result;
use crate::model::{Book, BookId, NewBook};
use chrono::{DateTime, Utc};
use std::future::Future;

pub mod inmemory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use inmemory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{PgBookStore, PgConfig};

/// Trait for book store implementations.
///
/// Futures are `Send` so services built on any store can run on a
/// multi-threaded runtime. Implementors may write plain `async fn`.
pub trait BookStore: Send + Sync + 'static {
    /// Insert a new row. The store assigns the id; `now` becomes both
    /// `created_at` and `updated_at`.
    ///
    /// # Errors
    /// Returns `Error::Store` if the insert fails
    fn insert(
        &self,
        book: &NewBook,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Book>> + Send;

    /// Fetch one book.
    ///
    /// # Returns
    /// - `Ok(Some(book))` - Row found
    /// - `Ok(None)` - No row for `id` (not an error)
    ///
    /// # Errors
    /// Returns `Error::Store` if the query fails
    fn fetch_by_id(&self, id: BookId) -> impl Future<Output = Result<Option<Book>>> + Send;

    /// Fetch every book, ordered by id. An empty table yields an empty vec.
    ///
    /// # Errors
    /// Returns `Error::Store` if the query fails
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Book>>> + Send;

    /// Persist all mutable fields of `book` (title, author, published_at,
    /// updated_at) to the row with the same id.
    ///
    /// Returns `Ok(None)` if the row no longer exists.
    ///
    /// # Errors
    /// Returns `Error::Store` if the update fails
    fn update(&self, book: &Book) -> impl Future<Output = Result<Option<Book>>> + Send;

    /// Delete by id. Deleting an absent id succeeds.
    ///
    /// # Errors
    /// Returns `Error::Store` if the delete fails
    fn delete(&self, id: BookId) -> impl Future<Output = Result<()>> + Send;

    /// Health check used by the readiness endpoint.
    ///
    /// # Errors
    /// Returns `Error::Store` if the store is not reachable
    fn health_check(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }
}
