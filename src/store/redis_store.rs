//! Redis-backed cache store.

use super::{CacheBackend, StoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache store on a Redis server.
///
/// Uses a [`ConnectionManager`], which reconnects on its own after a dropped
/// connection. Each trait call is one Redis command.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    ttl: Option<Duration>,
}

impl RedisStore {
    /// Connects to `url` (e.g. `redis://cache:6379`).
    ///
    /// `password` overrides any password embedded in the URL. With a `ttl`,
    /// every write sets that expiry on the key.
    pub async fn connect(
        url: &str,
        password: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut info = url.into_connection_info()?;
        if let Some(password) = password {
            info.redis.password = Some(password.to_string());
        }
        let client = redis::Client::open(info)?;
        let conn = ConnectionManager::new(client).await?;
        info!(%url, ?ttl, "Connected to Redis");
        Ok(Self { conn, ttl })
    }
}

#[async_trait]
impl CacheBackend for RedisStore {
    async fn put_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let written: redis::RedisResult<()> = match self.ttl {
            Some(ttl) if !ttl.is_zero() => conn.set_ex(key, value, ttl.as_secs().max(1)).await,
            _ => conn.set(key, value).await,
        };
        written.map_err(|e| {
            warn!(key, error = %e, "cache_error");
            StoreError::from(e)
        })
    }

    async fn get_raw(&self, key: &str) -> Result<String, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            warn!(key, error = %e, "cache_error");
            StoreError::from(e)
        })?;
        debug!(key, found = value.is_some(), "Retrieved key");
        value.ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await.map_err(|e| {
            warn!(key, error = %e, "cache_error");
            StoreError::from(e)
        })?;
        if removed == 0 {
            debug!(key, "Cache key not found");
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let mut conn = self.conn.clone();
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Cache not connected");
                false
            }
        }
    }
}
