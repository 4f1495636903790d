//! # Catalog Client
//!
//! Read-only access to the external catalog provider, the source of truth for
//! item names and prices.
//!
//! - [`HttpCatalogClient`] talks to the provider over HTTP.
//! - [`mock::MockCatalog`] is a scriptable stand-in for tests.
//!
//! Nothing here retries or caches; every call is one live round trip.

pub mod error;
pub mod http;
pub mod mock;

pub use error::*;
pub use http::HttpCatalogClient;

use crate::context::RequestContext;
use crate::model::CatalogItem;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one item by id.
    async fn get_item(&self, ctx: &RequestContext, id: &str) -> Result<CatalogItem, CatalogError>;

    /// Fetches the whole listing, in provider order. One bad entry fails the call.
    async fn get_all_items(&self, ctx: &RequestContext) -> Result<Vec<CatalogItem>, CatalogError>;

    /// `true` only when the provider reports itself healthy. Never errors.
    async fn health(&self, ctx: &RequestContext) -> bool;
}
