//! HTTP implementation of [`CatalogClient`].
//!
//! Provider contract:
//!
//! | Call | Request | Body |
//! |------|---------|------|
//! | item | `GET {base}/products/{id}` | `{"meta":{..},"data":{"id","name","price"}}`, 404 if unknown |
//! | listing | `GET {base}/products` | `{"meta":{..},"data":[..]}` |
//! | health | `GET {base}/health` | `{"meta":{..},"data":{"status":"OK"}}` |
//!
//! Prices arrive as decimal strings. Every request carries the caller's
//! correlation id in `X-Correlation-ID` and the time left before the caller's
//! deadline as its timeout.

use super::{CatalogClient, CatalogError};
use crate::context::RequestContext;
use crate::model::CatalogItem;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, error, info, instrument, warn};

pub const CORRELATION_HEADER: &str = "X-Correlation-ID";
const HEALTH_STATUS_OK: &str = "OK";
const PRODUCTS_PATH: &str = "products";
const HEALTH_PATH: &str = "health";

#[derive(Debug, Default, Deserialize)]
struct ProviderMeta {
    #[serde(default)]
    version: String,
}

#[derive(Debug, Deserialize)]
struct ProviderEnvelope<T> {
    #[serde(default)]
    meta: ProviderMeta,
    data: T,
}

#[derive(Debug, Deserialize)]
struct ProviderItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderHealth {
    #[serde(default)]
    status: String,
}

impl ProviderItem {
    fn into_catalog_item(self) -> Result<CatalogItem, CatalogError> {
        let raw = self.price.trim();
        // plain decimal or exponent form ("1e2")
        let price = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|e| {
                CatalogError::Upstream(format!(
                    "invalid price {:?} for item {}: {}",
                    self.price, self.id, e
                ))
            })?;
        Ok(CatalogItem {
            id: self.id,
            name: self.name,
            price,
        })
    }
}

/// Catalog client for the HTTP product provider.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Creates a client for the provider rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Like [`HttpCatalogClient::new`] with a preconfigured `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Upstream(format!("invalid catalog url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Upstream(format!(
                "catalog url {base_url} cannot be a base"
            )));
        }
        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in with_client
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, ctx: &RequestContext, url: Url) -> Result<reqwest::Response, CatalogError> {
        debug!(%url, "Calling catalog provider");
        self.client
            .get(url)
            .header(CORRELATION_HEADER, &ctx.correlation_id)
            .timeout(ctx.remaining())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Error calling catalog provider");
                CatalogError::from(e)
            })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ProviderEnvelope<T>, CatalogError> {
        let envelope: ProviderEnvelope<T> = response.json().await.map_err(|e| {
            error!(error = %e, "Unable to parse provider response");
            CatalogError::Upstream(format!("undecodable provider response: {e}"))
        })?;
        debug!(provider_version = %envelope.meta.version, "Decoded provider response");
        Ok(envelope)
    }
}

fn unexpected_status(status: StatusCode) -> CatalogError {
    CatalogError::Upstream(format!("unexpected provider status {status}"))
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    async fn get_item(&self, ctx: &RequestContext, id: &str) -> Result<CatalogItem, CatalogError> {
        let response = self.send(ctx, self.url(&[PRODUCTS_PATH, id])).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!("Item from catalog provider not found");
                return Err(CatalogError::NotFoundOnProvider(id.to_string()));
            }
            status if !status.is_success() => return Err(unexpected_status(status)),
            _ => {}
        }

        let envelope: ProviderEnvelope<ProviderItem> = Self::decode(response).await?;
        let item = envelope.data.into_catalog_item()?;
        debug!(name = %item.name, price = %item.price, "Item fetched");
        Ok(item)
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    async fn get_all_items(&self, ctx: &RequestContext) -> Result<Vec<CatalogItem>, CatalogError> {
        let response = self.send(ctx, self.url(&[PRODUCTS_PATH])).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(unexpected_status(status));
        }

        let envelope: ProviderEnvelope<Vec<ProviderItem>> = Self::decode(response).await?;
        let items = envelope
            .data
            .into_iter()
            .map(ProviderItem::into_catalog_item)
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = items.len(), "Fetched catalog listing");
        Ok(items)
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    async fn health(&self, ctx: &RequestContext) -> bool {
        let response = match self.send(ctx, self.url(&[HEALTH_PATH])).await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "Catalog health endpoint failed");
                return false;
            }
            Err(_) => return false,
        };

        match Self::decode::<ProviderHealth>(response).await {
            Ok(envelope) if envelope.data.status == HEALTH_STATUS_OK => true,
            Ok(envelope) => {
                warn!(provider_status = %envelope.data.status, "Catalog provider not healthy");
                false
            }
            Err(_) => false,
        }
    }
}
