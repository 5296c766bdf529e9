//! Metrics hooks for cache interactions.
//!
//! The service reports one event per cache call:
//! - `record_hit()` / `record_miss()` - list read-check outcome
//! - `record_set()` - list cache population
//! - `record_delete()` - invalidation after a write
//! - `record_error()` - any cache failure, fatal or swallowed
//!
//! ```ignore
//! use bookcache::observability::CacheCounters;
//! use std::sync::Arc;
//!
//! let counters = Arc::new(CacheCounters::default());
//! let service = BookService::with_metrics(
//!     store,
//!     backend,
//!     ServiceConfig::default(),
//!     counters.clone(),
//! );
//! // ...
//! info!("{:?}", counters.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trait for cache metrics collection.
///
/// Default bodies log at debug level; override what your backend collects.
pub trait CacheMetrics: Send + Sync {
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} took {:?}", key, duration);
    }

    fn record_delete(&self, key: &str, duration: Duration) {
        debug!("Cache DELETE: {} took {:?}", key, duration);
    }

    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_delete(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// In-process counters, cheap enough to leave on in production.
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`CacheCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CounterSnapshot {
    /// Hit ratio of list reads, `None` before the first read.
    pub fn hit_ratio(&self) -> Option<f64> {
        let reads = self.hits + self.misses;
        (reads > 0).then(|| self.hits as f64 / reads as f64)
    }
}

impl CacheCounters {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl CacheMetrics for CacheCounters {
    fn record_hit(&self, _key: &str, _duration: Duration) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self, _key: &str, _duration: Duration) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_set(&self, _key: &str, _duration: Duration) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    fn record_delete(&self, _key: &str, _duration: Duration) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self, key: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_hit("key", Duration::from_secs(1));
        metrics.record_error("key", "boom");
    }

    #[test]
    fn test_counters() {
        let counters = CacheCounters::default();
        counters.record_miss("books_list", Duration::ZERO);
        counters.record_set("books_list", Duration::ZERO);
        counters.record_hit("books_list", Duration::ZERO);
        counters.record_hit("books_list", Duration::ZERO);
        counters.record_delete("books_list", Duration::ZERO);
        counters.record_error("books_list", "down");

        let snap = counters.snapshot();
        assert_eq!(
            snap,
            CounterSnapshot {
                hits: 2,
                misses: 1,
                sets: 1,
                deletes: 1,
                errors: 1,
            }
        );
        let ratio = snap.hit_ratio().unwrap();
        assert!((ratio - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_ratio_without_reads() {
        assert_eq!(CounterSnapshot::default().hit_ratio(), None);
    }
}
