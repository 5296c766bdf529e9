//! PostgreSQL book store (SQLx).
//!
//! Expects this table, created outside the service:
//!
//! ```sql
//! CREATE TABLE books (
//!     id           BIGSERIAL PRIMARY KEY,
//!     title        TEXT        NOT NULL,
//!     author       TEXT        NOT NULL,
//!     published_at TIMESTAMPTZ NULL,
//!     created_at   TIMESTAMPTZ NOT NULL,
//!     updated_at   TIMESTAMPTZ NOT NULL
//! );
//! ```

use super::BookStore;
use crate::error::{Error, Result};
use crate::model::{Book, BookId, NewBook};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

const COLUMNS: &str = "id, title, author, published_at, created_at, updated_at";

/// Connection settings for [`PgBookStore`].
#[derive(Clone, Debug)]
pub struct PgConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PgConfig {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Book store on a shared `PgPool`. Cloning is cheap.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    /// Open a pool and verify the database answers.
    ///
    /// # Errors
    /// Returns `Error::Store` if no connection can be established.
    pub async fn connect(config: &PgConfig) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL at {}:{}/{} as {}",
            config.host, config.port, config.database, config.user
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await?;

        info!("PostgreSQL pool ready (max {} connections)", config.max_connections);
        Ok(PgBookStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgBookStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookStore for PgBookStore {
    async fn insert(&self, book: &NewBook, now: DateTime<Utc>) -> Result<Book> {
        let sql = format!(
            "INSERT INTO books (title, author, published_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.published_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("INSERT into books failed: {}", e);
                Error::from(e)
            })?;
        Ok(row)
    }

    async fn fetch_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("SELECT book {} failed: {}", id, e);
                Error::from(e)
            })?;
        Ok(row)
    }

    async fn fetch_all(&self) -> Result<Vec<Book>> {
        let sql = format!("SELECT {} FROM books ORDER BY id", COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("SELECT books failed: {}", e);
                Error::from(e)
            })?;
        Ok(rows)
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        let sql = format!(
            "UPDATE books SET title = $2, author = $3, published_at = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.published_at)
            .bind(book.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("UPDATE book {} failed: {}", book.id, e);
                Error::from(e)
            })?;
        Ok(row)
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("DELETE book {} failed: {}", id, e);
                Error::from(e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(one == 1)
    }
}
