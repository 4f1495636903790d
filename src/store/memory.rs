//! # In-process cache backend
//!
//! [`MemoryStore`] keeps entries in a [`moka`] cache owned by a single Tokio
//! task ([`MemoryStoreActor`]). Callers talk to the task over an mpsc channel
//! and get their answer back on a oneshot channel.
//!
//! With a TTL, entries expire that long after their last write and are
//! reclaimed by the cache's own maintenance, whether or not they are read again.
//!
//! When the task stops (every handle dropped, or the task aborted), calls fail
//! with [`StoreError::Unavailable`] and [`CacheBackend::is_alive`] reports
//! `false`, which is how tests simulate a backend outage.

use super::{CacheBackend, StoreError};
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Requests understood by the store task.
#[derive(Debug)]
enum StoreRequest {
    Put {
        key: String,
        value: String,
        respond_to: oneshot::Sender<()>,
    },
    Get {
        key: String,
        respond_to: oneshot::Sender<Option<String>>,
    },
    Delete {
        key: String,
        respond_to: oneshot::Sender<bool>,
    },
    Len {
        respond_to: oneshot::Sender<u64>,
    },
    Ping {
        respond_to: oneshot::Sender<()>,
    },
}

/// The task half of the in-process store. Owns the entries.
pub struct MemoryStoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    entries: Cache<String, String>,
    ttl: Option<Duration>,
}

impl MemoryStoreActor {
    /// Processes requests until every [`MemoryStore`] handle is dropped.
    pub async fn run(mut self) {
        info!(ttl = ?self.ttl, "Memory store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Put {
                    key,
                    value,
                    respond_to,
                } => {
                    self.entries.insert(key.clone(), value).await;
                    debug!(%key, "Put");
                    let _ = respond_to.send(());
                }
                StoreRequest::Get { key, respond_to } => {
                    let value = self.entries.get(&key).await;
                    debug!(%key, found = value.is_some(), "Get");
                    let _ = respond_to.send(value);
                }
                StoreRequest::Delete { key, respond_to } => {
                    // get skips expired entries, so an expired key counts as missing
                    let removed = self.entries.get(&key).await.is_some();
                    self.entries.invalidate(&key).await;
                    debug!(%key, removed, "Delete");
                    let _ = respond_to.send(removed);
                }
                StoreRequest::Len { respond_to } => {
                    self.entries.run_pending_tasks().await;
                    let _ = respond_to.send(self.entries.entry_count());
                }
                StoreRequest::Ping { respond_to } => {
                    let _ = respond_to.send(());
                }
            }
        }

        self.entries.run_pending_tasks().await;
        info!(size = self.entries.entry_count(), "Memory store shutdown");
    }
}

/// Cloneable handle to a running [`MemoryStoreActor`].
#[derive(Clone)]
pub struct MemoryStore {
    sender: mpsc::Sender<StoreRequest>,
}

impl MemoryStore {
    /// Creates the store task and its handle. Entries never expire.
    ///
    /// The actor must be driven with [`MemoryStoreActor::run`].
    pub fn new(buffer_size: usize) -> (MemoryStoreActor, Self) {
        Self::with_ttl(buffer_size, None)
    }

    /// Like [`MemoryStore::new`], expiring entries `ttl` after their last write.
    pub fn with_ttl(buffer_size: usize, ttl: Option<Duration>) -> (MemoryStoreActor, Self) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let mut builder = Cache::builder();
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        let actor = MemoryStoreActor {
            receiver,
            entries: builder.build(),
            ttl,
        };
        (actor, Self { sender })
    }

    /// Creates the store and spawns its task on the current runtime.
    pub fn spawn(buffer_size: usize) -> (Self, JoinHandle<()>) {
        let (actor, store) = Self::new(buffer_size);
        (store, tokio::spawn(actor.run()))
    }

    async fn call<R>(
        &self,
        request: StoreRequest,
        response: oneshot::Receiver<R>,
    ) -> Result<R, StoreError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| StoreError::Unavailable("memory store closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::Unavailable("memory store dropped response".to_string()))
    }

    /// Number of entries held, after expired ones are reclaimed.
    pub async fn len(&self) -> Result<u64, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.call(StoreRequest::Len { respond_to }, response).await
    }
}

#[async_trait]
impl CacheBackend for MemoryStore {
    async fn put_raw(&self, key: &str, value: String) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        let request = StoreRequest::Put {
            key: key.to_string(),
            value,
            respond_to,
        };
        self.call(request, response).await
    }

    async fn get_raw(&self, key: &str) -> Result<String, StoreError> {
        let (respond_to, response) = oneshot::channel();
        let request = StoreRequest::Get {
            key: key.to_string(),
            respond_to,
        };
        self.call(request, response)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        let request = StoreRequest::Delete {
            key: key.to_string(),
            respond_to,
        };
        if self.call(request, response).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(key.to_string()))
        }
    }

    async fn is_alive(&self) -> bool {
        let (respond_to, response) = oneshot::channel();
        self.call(StoreRequest::Ping { respond_to }, response)
            .await
            .is_ok()
    }
}
