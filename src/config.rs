//! Process settings, read once at startup.
//!
//! Every setting is a command-line flag with an environment fallback, so the
//! service runs unchanged from a `.env` file, a container environment, or
//! the shell. `main` loads `.env` through `dotenvy` before parsing.

use crate::policy::CacheReadPolicy;
use crate::service::ServiceConfig;
use clap::Parser;
use std::time::Duration;

#[cfg(feature = "postgres")]
use crate::store::PgConfig;
#[cfg(feature = "redis")]
use crate::{backend::RedisConfig, error::Result};

/// Settings for the book service.
#[derive(Parser, Debug, Clone)]
#[command(name = "bookcache", version, about = "Book CRUD service with a cached list endpoint")]
pub struct Settings {
    /// PostgreSQL host.
    #[arg(long, env = "DB_HOST", default_value = "postgres_container")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "qwerty", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "cruddb")]
    pub db_name: String,

    /// Upper bound on pooled store connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Redis address as host:port.
    #[arg(long, env = "REDIS_ADDR", default_value = "redis:6379")]
    pub redis_addr: String,

    /// Empty means no authentication.
    #[arg(long, env = "REDIS_PASSWORD", default_value = "", hide_env_values = true)]
    pub redis_password: String,

    #[arg(long, env = "REDIS_DB", default_value_t = 0)]
    pub redis_db: u32,

    #[arg(long, env = "REDIS_POOL_SIZE", default_value_t = 16)]
    pub redis_pool_size: u32,

    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub server_host: String,

    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub server_port: u16,

    /// Lifetime of the cached book list, in seconds.
    #[arg(long, env = "BOOKS_LIST_TTL_SECS", default_value_t = 300)]
    pub books_list_ttl_secs: u64,

    /// What a list read does when the cache backend fails:
    /// fail-fast or fall-back-to-store.
    #[arg(long, env = "CACHE_READ_POLICY", default_value = "fail-fast")]
    pub cache_read_policy: CacheReadPolicy,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_list_ttl(Duration::from_secs(self.books_list_ttl_secs))
            .with_cache_read_policy(self.cache_read_policy)
    }

    #[cfg(feature = "postgres")]
    pub fn pg_config(&self) -> PgConfig {
        PgConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// # Errors
    /// Returns `Error::Config` if `REDIS_ADDR` is not `host:port`.
    #[cfg(feature = "redis")]
    pub fn redis_config(&self) -> Result<RedisConfig> {
        let mut config = RedisConfig::from_addr(&self.redis_addr, &self.redis_password)?;
        config.database = self.redis_db;
        config.pool_size = self.redis_pool_size;
        Ok(config)
    }

    /// Log the effective settings. Secrets are not printed.
    pub fn log_summary(&self) {
        info!(
            "Store: postgres://{}@{}:{}/{} (max {} connections)",
            self.db_user, self.db_host, self.db_port, self.db_name, self.db_max_connections
        );
        info!(
            "Cache: redis://{}/{} (pool size {}, auth {})",
            self.redis_addr,
            self.redis_db,
            self.redis_pool_size,
            if self.redis_password.is_empty() { "off" } else { "on" }
        );
        info!(
            "Books list TTL {}s, cache read policy {}, request timeout {}s",
            self.books_list_ttl_secs, self.cache_read_policy, self.request_timeout_secs
        );
    }
}
