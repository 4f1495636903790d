use crate::cart::CartService;
use crate::catalog::{CatalogClient, CatalogError, HttpCatalogClient};
use crate::config::Config;
use crate::context::RequestContext;
use crate::store::{CacheBackend, MemoryStore, RedisStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors raised while wiring the system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Liveness of the service and each backend it depends on.
///
/// The three flags are probed independently; one failing probe does not
/// affect the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub version: String,
    pub service: bool,
    pub cache: bool,
    pub catalog: bool,
}

/// The wired-up cart system.
///
/// `CartSystem` is responsible for:
/// - **Dependency Wiring**: building the cache store and catalog client from [`Config`]
///   and handing them to the [`CartService`]
/// - **Lifecycle Management**: owning the in-process store task, when one is used
/// - **Health Aggregation**: probing the service and both backends
///
/// # Example
///
/// ```ignore
/// let system = CartSystem::from_config(Config::parse()).await?;
///
/// let ctx = system.context();
/// let cart = system.service.create_cart(&ctx).await?;
/// let cart = system.service.add_item(&ctx, &cart.id, "42", 3).await?;
///
/// let health = system.health().await;
/// system.shutdown().await?;
/// ```
pub struct CartSystem {
    /// The cart orchestrator. Clone the `Arc` to share it across request tasks.
    pub service: Arc<CartService>,

    config: Config,

    /// Background tasks owned by the system (the in-process store, if any).
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CartSystem {
    /// Builds the store and catalog client described by `config`.
    ///
    /// With `redis_url` set the carts live in Redis; otherwise an in-process
    /// [`MemoryStore`] task is started.
    pub async fn from_config(config: Config) -> Result<Self, SystemError> {
        let mut handles = Vec::new();

        let store: Arc<dyn CacheBackend> = match config.redis_url() {
            Some(url) => Arc::new(
                RedisStore::connect(&url, config.redis_password.as_deref(), config.cache_ttl())
                    .await?,
            ),
            None => {
                warn!("No Redis server configured, carts are kept in process memory");
                let (actor, store) = MemoryStore::with_ttl(64, config.cache_ttl());
                handles.push(tokio::spawn(actor.run()));
                Arc::new(store)
            }
        };

        let catalog: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new(&config.catalog_url)?);

        let mut system = Self::with_backends(config, store, catalog);
        system.handles = handles;
        Ok(system)
    }

    /// Wires the system around already-built backends.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn CacheBackend>,
        catalog: Arc<dyn CatalogClient>,
    ) -> Self {
        let service = Arc::new(CartService::new(store, catalog, config.service_version.clone()));
        info!(version = %config.service_version, "Cart system ready");
        Self {
            service,
            config,
            handles: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh request context with the configured deadline.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.config.request_timeout())
    }

    /// Probes the service, the cache store and the catalog provider.
    pub async fn health(&self) -> HealthReport {
        let ctx = self.context();
        info!(correlation_id = %ctx.correlation_id, "Performing health check");

        let store = self.service.store();
        let catalog = self.service.catalog();
        let (cache, catalog) = tokio::join!(
            ctx.bound(store.is_alive()),
            ctx.bound(catalog.health(&ctx)),
        );

        HealthReport {
            version: self.service.version().to_string(),
            service: self.service.is_alive(),
            cache: cache.unwrap_or(false),
            catalog: catalog.unwrap_or(false),
        }
    }

    /// Gracefully shuts down the system.
    ///
    /// Drops the service, which closes the in-process store's channel, then
    /// waits for owned tasks to finish. Every clone of [`CartSystem::service`]
    /// must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down cart system...");
        drop(self.service);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Background task failed: {:?}", e);
                return Err(format!("Background task failed: {:?}", e));
            }
        }

        info!("Cart system shutdown complete.");
        Ok(())
    }
}
