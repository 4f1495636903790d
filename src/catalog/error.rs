//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur while talking to the catalog provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The provider answered that the item does not exist.
    #[error("Item not found on provider: {0}")]
    NotFoundOnProvider(String),

    /// Network failure, unexpected status, undecodable body or bad price.
    #[error("Catalog provider error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Upstream(e.to_string())
    }
}
