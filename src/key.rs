//! Cache key layout.
//!
//! | Key          | Value                              |
//! |--------------|------------------------------------|
//! | `books_list` | envelope of `Vec<Book>`, fixed TTL |
//! | `book:{id}`  | envelope of `Book`                 |

use crate::entity::CacheEntity;

/// Key under which the full book list is cached.
pub const BOOKS_LIST_KEY: &str = "books_list";

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build full cache key from entity type and ID.
    pub fn build<T: CacheEntity>(id: &T::Key) -> String {
        format!("{}:{}", T::cache_prefix(), id)
    }
}
