//! In-memory book store.
//!
//! Backs the test suite and local runs without Postgres. Ids come from a
//! monotonically increasing counter starting at 1, like a `BIGSERIAL` column.

use super::BookStore;
use crate::error::Result;
use crate::model::{Book, BookId, NewBook};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Thread-safe in-memory store. Clones share the same rows.
#[derive(Clone)]
pub struct InMemoryStore {
    rows: Arc<DashMap<BookId, Book>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            rows: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for InMemoryStore {
    async fn insert(&self, book: &NewBook, now: DateTime<Utc>) -> Result<Book> {
        let id = BookId::new(self.next_id.fetch_add(1, Ordering::Relaxed))?;
        let row = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            published_at: book.published_at,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, row.clone());
        debug!("InMemory INSERT book {}", id);
        Ok(row)
    }

    async fn fetch_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn fetch_all(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.rows.iter().map(|row| row.clone()).collect();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        Ok(self.rows.get_mut(&book.id).map(|mut row| {
            row.title = book.title.clone();
            row.author = book.author.clone();
            row.published_at = book.published_at;
            row.updated_at = book.updated_at;
            row.clone()
        }))
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.rows.remove(&id);
        debug!("InMemory DELETE book {}", id);
        Ok(())
    }
}
