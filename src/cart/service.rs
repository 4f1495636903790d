//! # Cart Service
//!
//! The orchestrator. Every operation follows the same protocol:
//!
//! 1. **Load** the cart from the cache store.
//! 2. **Mutate** the in-memory copy (item rules are enforced here).
//! 3. **Write** the whole cart back.
//! 4. **Enrich** the result with live names and prices from the catalog.
//!
//! Steps 1–3 run while holding the cart's entry in [`CartLocks`], so
//! concurrent mutations of one cart are applied one after another. Step 4
//! runs after the lock is released.
//!
//! ## Enrichment
//!
//! Lookups for all items of a cart are issued concurrently. The first failure
//! drops the outstanding lookups and the call fails without returning any
//! items. Names and prices from the store are never trusted.
//!
//! ## Partial success
//!
//! If the write succeeds but enrichment fails, mutating operations return
//! [`CartError::ExternalAfterWrite`] carrying the stored cart, so the caller
//! can tell that the change was applied.

use super::error::CartError;
use super::locks::CartLocks;
use crate::catalog::{CatalogClient, CatalogError};
use crate::context::RequestContext;
use crate::model::{Cart, CartItem, CatalogItem};
use crate::store::{CacheBackend, CacheStore, StoreError};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// Cart lifecycle and mutation rules on top of a cache store and a catalog.
pub struct CartService {
    store: Arc<dyn CacheBackend>,
    catalog: Arc<dyn CatalogClient>,
    locks: CartLocks,
    version: String,
}

impl CartService {
    pub fn new(
        store: Arc<dyn CacheBackend>,
        catalog: Arc<dyn CatalogClient>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            locks: CartLocks::new(),
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The service itself is alive whenever it can answer.
    pub fn is_alive(&self) -> bool {
        true
    }

    pub fn store(&self) -> &Arc<dyn CacheBackend> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    // -------------------------------------------------------------------------
    // Cart operations
    // -------------------------------------------------------------------------

    /// Creates and stores an empty cart with a new random id.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn create_cart(&self, ctx: &RequestContext) -> Result<Cart, CartError> {
        let cart = Cart::new();
        info!(cart_id = %cart.id, "Creating new cart");
        self.save(ctx, &cart).await?;
        Ok(cart)
    }

    /// Loads a cart and enriches every item.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn get_cart(&self, ctx: &RequestContext, cart_id: &str) -> Result<Cart, CartError> {
        let mut cart = self.load(ctx, cart_id).await?;
        self.enrich(ctx, &mut cart).await.map_err(CartError::External)?;
        Ok(cart)
    }

    /// Appends `item_id` to the cart. The item must not be in the cart yet.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn add_item(
        &self,
        ctx: &RequestContext,
        cart_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        validate_quantity(quantity)?;
        let cart = self
            .mutate(ctx, cart_id, |cart| {
                if cart.contains(item_id) {
                    warn!("Item already in cart");
                    return Err(CartError::ItemAlreadyInCart {
                        cart_id: cart_id.to_string(),
                        item_id: item_id.to_string(),
                    });
                }
                cart.items.push(CartItem::new(item_id, quantity));
                Ok(())
            })
            .await?;
        self.enrich_after_write(ctx, cart).await
    }

    /// Replaces the quantity of an item already in the cart.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn modify_item(
        &self,
        ctx: &RequestContext,
        cart_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        validate_quantity(quantity)?;
        let cart = self
            .mutate(ctx, cart_id, |cart| {
                let idx = find_item(cart, item_id)?;
                cart.items[idx].quantity = quantity;
                Ok(())
            })
            .await?;
        self.enrich_after_write(ctx, cart).await
    }

    /// Removes an item, keeping the order of the remaining items.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn delete_item(
        &self,
        ctx: &RequestContext,
        cart_id: &str,
        item_id: &str,
    ) -> Result<Cart, CartError> {
        let cart = self
            .mutate(ctx, cart_id, |cart| {
                let idx = find_item(cart, item_id)?;
                cart.items.remove(idx);
                Ok(())
            })
            .await?;
        self.enrich_after_write(ctx, cart).await
    }

    /// Empties the cart. The result has no items, so nothing is enriched.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn delete_all_items(
        &self,
        ctx: &RequestContext,
        cart_id: &str,
    ) -> Result<Cart, CartError> {
        self.mutate(ctx, cart_id, |cart| {
            cart.items.clear();
            Ok(())
        })
        .await
    }

    /// Removes the cart record entirely.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn delete_cart(&self, ctx: &RequestContext, cart_id: &str) -> Result<(), CartError> {
        let result = ctx
            .bound(async {
                let _guard = self.locks.lock(cart_id).await;
                info!("Deleting cart entirely");
                self.store.delete(cart_id).await
            })
            .await
            .map_err(|_| StoreError::Unavailable(DEADLINE_EXCEEDED.to_string()))
            .and_then(|deleted| deleted);

        result.map_err(|e| {
            error!(error = %e, "Unable to delete cart");
            store_error(cart_id, e)
        })
    }

    // -------------------------------------------------------------------------
    // Catalog pass-through
    // -------------------------------------------------------------------------

    /// Lists every item the catalog provider offers.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn list_items(&self, ctx: &RequestContext) -> Result<Vec<CatalogItem>, CartError> {
        info!("Fetching all items from provider");
        ctx.bound(self.catalog.get_all_items(ctx))
            .await
            .map_err(|_| CartError::External(DEADLINE_EXCEEDED.to_string()))?
            .map_err(|e| {
                error!(error = %e, "Error fetching items from provider");
                catalog_error(e)
            })
    }

    /// Fetches one item from the catalog provider.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id, version = %self.version))]
    pub async fn get_item(&self, ctx: &RequestContext, item_id: &str) -> Result<CatalogItem, CartError> {
        info!("Fetching item from provider");
        ctx.bound(self.catalog.get_item(ctx, item_id))
            .await
            .map_err(|_| CartError::External(DEADLINE_EXCEEDED.to_string()))?
            .map_err(|e| {
                error!(error = %e, "Error fetching item from provider");
                catalog_error(e)
            })
    }

    // -------------------------------------------------------------------------
    // Protocol steps
    // -------------------------------------------------------------------------

    async fn load(&self, ctx: &RequestContext, cart_id: &str) -> Result<Cart, CartError> {
        debug!("Getting cart from store");
        let loaded = ctx
            .bound(self.store.get::<Cart>(cart_id))
            .await
            .unwrap_or_else(|_| Err(StoreError::Unavailable(DEADLINE_EXCEEDED.to_string())));
        loaded.map_err(|e| {
            warn!(error = %e, "Unable to get cart from store");
            store_error(cart_id, e)
        })
    }

    async fn save(&self, ctx: &RequestContext, cart: &Cart) -> Result<(), CartError> {
        debug!(items = cart.items.len(), "Saving cart to store");
        let saved = ctx
            .bound(self.store.put(&cart.id, cart))
            .await
            .unwrap_or_else(|_| Err(StoreError::Unavailable(DEADLINE_EXCEEDED.to_string())));
        saved.map_err(|e| {
            error!(error = %e, "Unable to save cart in store");
            match e {
                // a write never reports a missing key
                StoreError::NotFound(key) => {
                    CartError::StoreUnavailable(format!("write reported missing key {key}"))
                }
                other => store_error(&cart.id, other),
            }
        })
    }

    /// Load, apply `change`, write back, all under the cart's lock.
    ///
    /// If `change` fails nothing is written.
    async fn mutate<F>(&self, ctx: &RequestContext, cart_id: &str, change: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError> + Send,
    {
        let cycle = async {
            let _guard = self.locks.lock(cart_id).await;
            let mut cart = self.load(ctx, cart_id).await?;
            change(&mut cart)?;
            self.save(ctx, &cart).await?;
            Ok(cart)
        };
        ctx.bound(cycle)
            .await
            .unwrap_or_else(|_| Err(CartError::StoreUnavailable(DEADLINE_EXCEEDED.to_string())))
    }

    /// Overlays live names and prices onto every item, or changes nothing.
    async fn enrich(&self, ctx: &RequestContext, cart: &mut Cart) -> Result<(), String> {
        if cart.items.is_empty() {
            return Ok(());
        }
        debug!(items = cart.items.len(), "Populating items from provider");

        let lookups = cart
            .items
            .iter()
            .map(|item| self.catalog.get_item(ctx, &item.item_id));
        let fetched = match ctx.bound(try_join_all(lookups)).await {
            Ok(Ok(fetched)) => fetched,
            Ok(Err(e)) => {
                error!(error = %e, "Unable to get item from provider");
                return Err(e.to_string());
            }
            Err(_) => {
                error!("Deadline exceeded while fetching items from provider");
                return Err(DEADLINE_EXCEEDED.to_string());
            }
        };

        for (item, live) in cart.items.iter_mut().zip(fetched) {
            item.name = live.name;
            item.price = live.price;
        }
        Ok(())
    }

    async fn enrich_after_write(&self, ctx: &RequestContext, cart: Cart) -> Result<Cart, CartError> {
        let mut enriched = cart.clone();
        match self.enrich(ctx, &mut enriched).await {
            Ok(()) => Ok(enriched),
            Err(reason) => Err(CartError::ExternalAfterWrite {
                persisted: Box::new(cart),
                reason,
            }),
        }
    }
}

fn validate_quantity(quantity: u32) -> Result<(), CartError> {
    if quantity == 0 {
        warn!("Rejecting zero quantity");
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}

fn find_item(cart: &Cart, item_id: &str) -> Result<usize, CartError> {
    cart.position(item_id).ok_or_else(|| {
        warn!("Unable to find item inside cart");
        CartError::ItemNotFound {
            cart_id: cart.id.clone(),
            item_id: item_id.to_string(),
        }
    })
}

fn store_error(cart_id: &str, e: StoreError) -> CartError {
    match e {
        StoreError::NotFound(_) => CartError::CartNotFound(cart_id.to_string()),
        StoreError::Unavailable(msg) => CartError::StoreUnavailable(msg),
        StoreError::Serialization(msg) => CartError::Serialization(msg),
    }
}

fn catalog_error(e: CatalogError) -> CartError {
    match e {
        CatalogError::NotFoundOnProvider(id) => CartError::ItemNotFoundOnProvider(id),
        CatalogError::Upstream(msg) => CartError::External(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::MockCatalog;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn ctx() -> RequestContext {
        RequestContext::new(Duration::from_secs(5))
    }

    fn service(catalog: &MockCatalog) -> (CartService, MemoryStore) {
        let (store, _handle) = MemoryStore::spawn(32);
        let service = CartService::new(
            Arc::new(store.clone()),
            Arc::new(catalog.clone()),
            "test",
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_add_item_appends_zero_valued_line_and_enriches() {
        let catalog = MockCatalog::with_items([CatalogItem::new("42", "Widget", Decimal::new(999, 2))]);
        let (service, store) = service(&catalog);
        let cart = service.create_cart(&ctx()).await.unwrap();

        let updated = service.add_item(&ctx(), &cart.id, "42", 3).await.unwrap();
        assert_eq!(updated.items[0].name, "Widget");
        assert_eq!(updated.items[0].price, Decimal::new(999, 2));

        // the stored copy carries no catalog data
        let stored: Cart = store.get(&cart.id).await.unwrap();
        assert_eq!(stored.items, vec![CartItem::new("42", 3)]);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_before_load() {
        let catalog = MockCatalog::new();
        let (service, _store) = service(&catalog);

        let result = service.add_item(&ctx(), "missing", "1", 0).await;
        assert_eq!(result, Err(CartError::InvalidQuantity(0)));

        let result = service.modify_item(&ctx(), "missing", "1", 0).await;
        assert_eq!(result, Err(CartError::InvalidQuantity(0)));
    }

    #[tokio::test]
    async fn test_modify_item_overwrites_quantity() {
        let catalog = MockCatalog::with_items([CatalogItem::new("a", "A", Decimal::ONE)]);
        let (service, _store) = service(&catalog);
        let cart = service.create_cart(&ctx()).await.unwrap();
        service.add_item(&ctx(), &cart.id, "a", 1).await.unwrap();

        let updated = service.modify_item(&ctx(), &cart.id, "a", 7).await.unwrap();
        assert_eq!(updated.items[0].quantity, 7);

        let missing = service.modify_item(&ctx(), &cart.id, "zzz", 2).await;
        assert!(matches!(missing, Err(CartError::ItemNotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_cart_needs_no_catalog() {
        let catalog = MockCatalog::new();
        let (service, _store) = service(&catalog);
        let cart = service.create_cart(&ctx()).await.unwrap();

        let loaded = service.get_cart(&ctx(), &cart.id).await.unwrap();
        assert!(loaded.items.is_empty());
        assert!(catalog.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_get_item_maps_provider_not_found() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_get_item("nope")
            .return_err(CatalogError::NotFoundOnProvider("nope".into()));
        let (service, _store) = service(&catalog);

        let result = service.get_item(&ctx(), "nope").await;
        assert_eq!(result, Err(CartError::ItemNotFoundOnProvider("nope".into())));
        assert_eq!(result.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_items_maps_upstream_failure() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_get_all_items()
            .return_err(CatalogError::Upstream("bad price".into()));
        let (service, _store) = service(&catalog);

        let result = service.list_items(&ctx()).await;
        assert_eq!(result, Err(CartError::External("bad price".into())));
        catalog.verify();
    }

    /// Reads succeed with an empty cart; writes report a missing key.
    struct MissingOnWrite;

    #[async_trait]
    impl CacheBackend for MissingOnWrite {
        async fn put_raw(&self, key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::NotFound(key.to_string()))
        }

        async fn get_raw(&self, key: &str) -> Result<String, StoreError> {
            Ok(format!(r#"{{"id":"{key}","items":[]}}"#))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn is_alive(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_write_reporting_missing_key_is_store_unavailable() {
        let catalog = MockCatalog::new();
        let service = CartService::new(Arc::new(MissingOnWrite), Arc::new(catalog), "test");

        let result = service.delete_all_items(&ctx(), "c1").await;
        assert_eq!(
            result,
            Err(CartError::StoreUnavailable(
                "write reported missing key c1".into()
            ))
        );
        assert_eq!(result.unwrap_err().status_code(), 500);
    }
}
