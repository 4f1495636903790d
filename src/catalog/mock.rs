//! # Mock Catalog
//!
//! A scriptable [`CatalogClient`] for tests. Nothing goes over the network.
//!
//! Responses are registered per item id with an expectation builder and are
//! answered every time that id is looked up. [`MockCatalog::verify`] fails the
//! test if a registered expectation was never used.
//!
//! ```ignore
//! let mut catalog = MockCatalog::new();
//! catalog.expect_get_item("42").return_ok(CatalogItem::new("42", "Widget", Decimal::new(999, 2)));
//! catalog.expect_get_item("7").return_err(CatalogError::NotFoundOnProvider("7".into()));
//!
//! let service = CartService::new(store, Arc::new(catalog.clone()), "test");
//! // ...
//! catalog.verify();
//! ```
//!
//! A lookup for an id with no expectation panics, like an unexpected request
//! to a strict mock.

use super::{CatalogClient, CatalogError};
use crate::context::RequestContext;
use crate::model::CatalogItem;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Response<T> {
    Ok(T),
    Err(CatalogError),
    /// Never answers; only the caller's deadline ends the call.
    Hang,
}

#[derive(Debug)]
struct Expectation<T> {
    response: Response<T>,
    hits: usize,
}

impl<T> Expectation<T> {
    fn new(response: Response<T>) -> Self {
        Self { response, hits: 0 }
    }
}

#[derive(Debug)]
struct MockState {
    items: HashMap<String, Expectation<CatalogItem>>,
    listing: Option<Expectation<Vec<CatalogItem>>>,
    healthy: bool,
    lookups: Vec<String>,
}

/// In-memory catalog with expectation tracking. Clones share state.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// A healthy catalog with no expectations.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                items: HashMap::new(),
                listing: None,
                healthy: true,
                lookups: Vec::new(),
            })),
        }
    }

    /// A catalog that answers each of `items` by id.
    pub fn with_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut mock = Self::new();
        for item in items {
            mock.expect_get_item(item.id.clone()).return_ok(item);
        }
        mock
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expects lookups of `id`.
    pub fn expect_get_item(&mut self, id: impl Into<String>) -> GetItemExpectationBuilder {
        GetItemExpectationBuilder {
            id: id.into(),
            state: self.state.clone(),
        }
    }

    /// Expects listing calls.
    pub fn expect_get_all_items(&mut self) -> ListingExpectationBuilder {
        ListingExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Sets what [`CatalogClient::health`] reports.
    pub fn set_healthy(&self, healthy: bool) {
        self.state().healthy = healthy;
    }

    /// Item ids looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.state().lookups.clone()
    }

    /// Verifies that every registered expectation was used at least once.
    pub fn verify(&self) {
        let state = self.state();
        let mut unused: Vec<&str> = state
            .items
            .iter()
            .filter(|(_, exp)| exp.hits == 0)
            .map(|(id, _)| id.as_str())
            .collect();
        if state.listing.as_ref().is_some_and(|exp| exp.hits == 0) {
            unused.push("<listing>");
        }
        if !unused.is_empty() {
            unused.sort_unstable();
            panic!("Not all expectations were met. Unused: {unused:?}");
        }
    }
}

async fn answer<T>(response: Response<T>) -> Result<T, CatalogError> {
    match response {
        Response::Ok(value) => Ok(value),
        Response::Err(e) => Err(e),
        Response::Hang => std::future::pending().await,
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn get_item(&self, _ctx: &RequestContext, id: &str) -> Result<CatalogItem, CatalogError> {
        let response = {
            let mut state = self.state();
            state.lookups.push(id.to_string());
            match state.items.get_mut(id) {
                Some(exp) => {
                    exp.hits += 1;
                    exp.response.clone()
                }
                None => panic!("Unexpected catalog lookup for item {id:?}"),
            }
        };
        answer(response).await
    }

    async fn get_all_items(&self, _ctx: &RequestContext) -> Result<Vec<CatalogItem>, CatalogError> {
        let response = {
            let mut state = self.state();
            match state.listing.as_mut() {
                Some(exp) => {
                    exp.hits += 1;
                    exp.response.clone()
                }
                None => panic!("Unexpected catalog listing request"),
            }
        };
        answer(response).await
    }

    async fn health(&self, _ctx: &RequestContext) -> bool {
        self.state().healthy
    }
}

/// Builder for item lookup expectations.
pub struct GetItemExpectationBuilder {
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl GetItemExpectationBuilder {
    fn set(self, response: Response<CatalogItem>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.items.insert(self.id, Expectation::new(response));
    }

    /// Answers with `item`.
    pub fn return_ok(self, item: CatalogItem) {
        self.set(Response::Ok(item));
    }

    /// Answers with `error`.
    pub fn return_err(self, error: CatalogError) {
        self.set(Response::Err(error));
    }

    /// Never answers.
    pub fn hang(self) {
        self.set(Response::Hang);
    }
}

/// Builder for listing expectations.
pub struct ListingExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl ListingExpectationBuilder {
    fn set(self, response: Response<Vec<CatalogItem>>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.listing = Some(Expectation::new(response));
    }

    pub fn return_ok(self, items: Vec<CatalogItem>) {
        self.set(Response::Ok(items));
    }

    pub fn return_err(self, error: CatalogError) {
        self.set(Response::Err(error));
    }
}
