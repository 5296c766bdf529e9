//! Test doubles shared by the integration tests.
//!
//! - [`FlakyBackend`]: in-memory cache whose reads or writes can be switched
//!   to fail
//! - [`CountingStore`]: in-memory store that counts full scans and can be
//!   switched to fail

#![allow(dead_code)]

use bookcache::backend::{CacheBackend, InMemoryBackend};
use bookcache::model::{Book, BookId, NewBook};
use bookcache::store::{BookStore, InMemoryStore};
use bookcache::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Default)]
pub struct FlakyBackend {
    inner: InMemoryBackend,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryBackend {
        &self.inner
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(Error::Cache(format!("injected {} failure", op)))
        } else {
            Ok(())
        }
    }
}

impl CacheBackend for FlakyBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check(&self.fail_reads, "GET")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.check(&self.fail_writes, "SET")?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(&self.fail_writes, "DELETE")?;
        self.inner.delete(key).await
    }

    async fn mdelete(&self, keys: &[&str]) -> Result<()> {
        self.check(&self.fail_writes, "MDELETE")?;
        self.inner.mdelete(keys).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.check(&self.fail_writes, "FLUSH")?;
        self.inner.clear_all().await
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail_reads.load(Ordering::SeqCst))
    }
}

#[derive(Clone, Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    scans: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `fetch_all` calls so far.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Error::Store("injected store failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl BookStore for CountingStore {
    async fn insert(&self, book: &NewBook, now: DateTime<Utc>) -> Result<Book> {
        self.check()?;
        self.inner.insert(book, now).await
    }

    async fn fetch_by_id(&self, id: BookId) -> Result<Option<Book>> {
        self.check()?;
        self.inner.fetch_by_id(id).await
    }

    async fn fetch_all(&self) -> Result<Vec<Book>> {
        self.check()?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_all().await
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        self.check()?;
        self.inner.update(book).await
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.check()?;
        Ok(true)
    }
}
