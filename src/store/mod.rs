//! # Cache Store
//!
//! Key-value persistence for carts.
//!
//! The store is split in two layers:
//!
//! - [`CacheBackend`] moves raw strings to and from a backend. It is object-safe,
//!   so the cart service holds it as `Arc<dyn CacheBackend>`.
//! - [`CacheStore`] adds typed `put`/`get` on top, encoding values as JSON. It is
//!   implemented for every backend, including `dyn CacheBackend`.
//!
//! Two backends ship with the crate: [`RedisStore`] for deployments and
//! [`MemoryStore`], an in-process actor used for local runs and tests.
//!
//! No call is retried. Writes are unconditional overwrites.

pub mod error;
pub mod memory;
pub mod redis_store;

pub use error::*;
pub use memory::{MemoryStore, MemoryStoreActor};
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Raw string operations against a key-value backend.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn put_raw(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Loads the value under `key`. A missing key is [`StoreError::NotFound`].
    async fn get_raw(&self, key: &str) -> Result<String, StoreError>;

    /// Removes `key`. Fails with [`StoreError::NotFound`] if nothing was removed.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Best-effort liveness probe.
    async fn is_alive(&self) -> bool;
}

/// Typed access to a [`CacheBackend`], encoding values as JSON.
#[async_trait]
pub trait CacheStore: CacheBackend {
    async fn put<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let encoded = serde_json::to_string(value).map_err(|e| {
            warn!(key, error = %e, "Unable to encode value");
            StoreError::from(e)
        })?;
        debug!(key, bytes = encoded.len(), "Saving value to key");
        self.put_raw(key, encoded).await
    }

    async fn get<T>(&self, key: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let raw = self.get_raw(key).await?;
        serde_json::from_str(&raw).map_err(|e| {
            warn!(key, error = %e, "Stored payload is malformed");
            StoreError::from(e)
        })
    }
}

impl<B: CacheBackend + ?Sized> CacheStore for B {}
