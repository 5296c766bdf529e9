//! Versioned envelope for every value written to the cache.
//!
//! ```text
//! ┌─────────────────┬──────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│ VERSION (varint) │ POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴──────────────────┴──────────────────────────┘
//!   "BKCH"             u32                postcard::to_allocvec(T)
//! ```
//!
//! The header is decoded and checked before the payload, so an entry written
//! by an older `Book` layout surfaces as `Error::VersionMismatch` rather than
//! as a garbled payload.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for cache entries written by this crate.
pub const CACHE_MAGIC: [u8; 4] = *b"BKCH";

/// Current schema version.
///
/// Bump when `Book` changes shape (fields added, removed, reordered or
/// retyped). Entries carrying another version are evicted and recomputed.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Envelope wrapped around every cached payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Must be [`CACHE_MAGIC`]
    pub magic: [u8; 4],
    /// Must be [`CURRENT_SCHEMA_VERSION`]
    pub version: u32,
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Leading fields of [`CacheEnvelope`]; postcard encodes struct fields in
/// order, so this decodes the prefix of any envelope.
#[derive(Deserialize)]
struct EnvelopeHeader {
    magic: [u8; 4],
    version: u32,
}

/// Serialize a value with envelope for cache storage.
///
/// # Errors
///
/// Returns `Error::Serialization` if postcard encoding fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(&CacheEnvelope::new(value)).map_err(|e| {
        error!("Cache serialization failed: {}", e);
        Error::Serialization(e.to_string())
    })
}

/// Deserialize a value from cache storage.
///
/// # Errors
///
/// - `Error::CacheEntry`: truncated header, bad magic or corrupt payload
/// - `Error::VersionMismatch`: written by another schema version
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let (header, payload) = postcard::take_from_bytes::<EnvelopeHeader>(bytes)
        .map_err(|e| Error::CacheEntry(format!("unreadable envelope header: {}", e)))?;

    if header.magic != CACHE_MAGIC {
        warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC, header.magic
        );
        return Err(Error::CacheEntry(format!(
            "invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, header.magic
        )));
    }

    if header.version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, header.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: header.version,
        });
    }

    postcard::from_bytes(payload).map_err(|e| {
        error!("Cache payload deserialization failed: {}", e);
        Error::CacheEntry(format!("corrupt payload: {}", e))
    })
}
