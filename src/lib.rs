//! # bookcache
//!
//! A book CRUD service with a cache-aside list cache.
//!
//! The relational store is the source of truth. The cache holds one derived
//! entry, `books_list`, populated on a list miss with a fixed TTL and deleted
//! by every write. Single-book reads always go to the store.
//!
//! ## Layout
//!
//! - [`BookService`]: the only component with decision logic
//! - [`store::BookStore`]: PostgreSQL (`postgres` feature) or in-memory rows
//! - [`backend::CacheBackend`]: Redis (`redis` feature) or in-memory bytes
//! - [`http::router`]: the axum surface over the service
//! - [`config::Settings`]: flags with environment fallbacks
//!
//! ## Quick Start
//!
//! ```ignore
//! use bookcache::{BookService, NewBook, ServiceConfig};
//! use bookcache::backend::InMemoryBackend;
//! use bookcache::store::InMemoryStore;
//!
//! let service = BookService::new(InMemoryStore::new(), InMemoryBackend::new(), ServiceConfig::default());
//!
//! let dune = service.create(NewBook::new("Dune", "Herbert")).await?;
//! let listing = service.list().await?;   // MISS: read from the store, cached
//! let listing = service.list().await?;   // HIT
//! service.delete(dune.id).await?;        // invalidates books_list
//! ```
//!
//! ## Features
//!
//! - `inmemory` (default): in-memory cache backend
//! - `redis`: `RedisBackend` on a deadpool pool
//! - `postgres`: `PgBookStore` on an SQLx pool
//! - `server`: `redis` + `postgres`, required by the `bookcache` binary

#[macro_use]
extern crate log;

pub mod backend;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod key;
pub mod model;
pub mod observability;
pub mod policy;
pub mod serialization;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use entity::CacheEntity;
pub use error::{Error, Result};
pub use model::{Book, BookId, BookPatch, NewBook};
pub use policy::{CacheReadPolicy, CacheStatus};
pub use service::{BookService, Health, Listing, ServiceConfig};
pub use store::BookStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
