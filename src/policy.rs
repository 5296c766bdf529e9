//! Cache read policy and the hit/miss tag attached to list reads.
//!
//! # Read-check failure handling
//!
//! | Policy | Backend error on `books_list` read |
//! |--------|------------------------------------|
//! | **FailFast** (default) | request fails with `Error::Cache` |
//! | **FallBackToStore** | logged, read served from the store |
//!
//! FailFast keeps a broken cache visible to callers; FallBackToStore keeps
//! the list endpoint available while the cache is down. A clean miss and an
//! undecodable entry always fall through to the store under either policy.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// What `list()` does when the cache backend itself fails on the read-check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CacheReadPolicy {
    /// Propagate the backend error to the caller.
    #[default]
    FailFast,

    /// Log the backend error and read from the store.
    FallBackToStore,
}

impl fmt::Display for CacheReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheReadPolicy::FailFast => write!(f, "fail-fast"),
            CacheReadPolicy::FallBackToStore => write!(f, "fall-back-to-store"),
        }
    }
}

impl FromStr for CacheReadPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(CacheReadPolicy::FailFast),
            "fall-back-to-store" | "fallback" => Ok(CacheReadPolicy::FallBackToStore),
            other => Err(Error::Config(format!(
                "unknown cache read policy {:?} (expected fail-fast or fall-back-to-store)",
                other
            ))),
        }
    }
}

/// Where a list read was served from. Rendered as the `X-Cache` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
