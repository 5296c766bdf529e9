//! Redis cache backend implementation.

use super::CacheBackend;
use crate::error::{Error, Result};
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use std::time::Duration;

/// Pool statistics information.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Default Redis connection pool size.
const DEFAULT_POOL_SIZE: u32 = 16;

/// Configuration for Redis backend.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub database: u32,
    pub pool_size: u32,
    /// Upper bound on waiting for a pooled connection.
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            database: 0,
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Build a config from a `host:port` address. An empty password means
    /// no authentication.
    ///
    /// # Errors
    /// Returns `Error::Config` if the address has no valid port.
    pub fn from_addr(addr: &str, password: &str) -> Result<Self> {
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| Error::Config(format!("Redis address {:?} is not host:port", addr)))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("Redis address {:?} has an invalid port", addr)))?;
        if host.is_empty() {
            return Err(Error::Config(format!("Redis address {:?} has no host", addr)));
        }

        Ok(RedisConfig {
            host: host.to_string(),
            port,
            password: (!password.is_empty()).then(|| password.to_string()),
            ..RedisConfig::default()
        })
    }

    /// Build Redis connection string.
    pub fn connection_string(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://default:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

/// Redis backend with connection pooling.
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create new Redis backend from configuration.
    ///
    /// The pool connects lazily; call `health_check` to verify reachability.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let mut cfg = PoolConfig::from_url(config.connection_string());
        let mut pool_cfg = deadpool_redis::PoolConfig::new(config.pool_size as usize);
        pool_cfg.timeouts.wait = Some(config.connection_timeout);
        pool_cfg.timeouts.create = Some(config.connection_timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::Config(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "Redis backend initialized: {}:{} (db {}, pool size {})",
            config.host, config.port, config.database, config.pool_size
        );

        Ok(RedisBackend { pool })
    }

    pub fn pool_stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            connections: status.size as u32,
            idle_connections: status.available as u32,
        }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::Cache(format!("Failed to get Redis connection: {}", e)))
    }
}

impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| Error::Cache(format!("Redis GET failed for key {}: {}", key, e)))?;

        if value.is_some() {
            debug!("Redis GET {} -> HIT", key);
        } else {
            debug!("Redis GET {} -> MISS", key);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;

        match ttl {
            Some(duration) => {
                // SET EX rejects 0; round sub-second TTLs up.
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(|e| {
                        Error::Cache(format!("Redis SET_EX failed for key {}: {}", key, e))
                    })?;
                debug!("Redis SET {} (TTL: {}s)", key, seconds);
            }
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(|e| {
                    Error::Cache(format!("Redis SET failed for key {}: {}", key, e))
                })?;
                debug!("Redis SET {}", key);
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;

        conn.del::<_, ()>(key)
            .await
            .map_err(|e| Error::Cache(format!("Redis DEL failed for key {}: {}", key, e)))?;

        debug!("Redis DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;

        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| Error::Cache(format!("Redis EXISTS failed for key {}: {}", key, e)))?;

        Ok(exists)
    }

    async fn mdelete(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;

        conn.del::<_, ()>(keys)
            .await
            .map_err(|e| Error::Cache(format!("Redis DEL (bulk) failed: {}", e)))?;

        debug!("Redis MDELETE {} keys", keys.len());
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        let mut conn = self.connection().await?;

        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| Error::Cache(format!("Redis FLUSHDB failed: {}", e)))?;

        warn!("Redis database flushed");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::Cache(format!("Redis PING failed: {}", e)))?;

        Ok(pong.contains("PONG"))
    }
}
