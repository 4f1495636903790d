//! Error types for the cart service.
//!
//! Every store and catalog failure is translated into a [`CartError`] before it
//! leaves the service; callers never see a Redis or HTTP error type.

use crate::model::Cart;
use thiserror::Error;

/// Errors returned by [`CartService`](super::CartService) operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// No cart is stored under the id.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// The cart exists but does not contain the item.
    #[error("Item {item_id} not found in cart {cart_id}")]
    ItemNotFound { cart_id: String, item_id: String },

    /// The catalog provider does not know the item.
    #[error("Item not found on provider: {0}")]
    ItemNotFoundOnProvider(String),

    /// The item is already in the cart; the cart was left unchanged.
    #[error("Item {item_id} already in cart {cart_id}")]
    ItemAlreadyInCart { cart_id: String, item_id: String },

    /// Quantities must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The catalog provider failed; nothing was written.
    #[error("External provider error: {0}")]
    External(String),

    /// The cart was written, but enriching the result failed.
    ///
    /// `persisted` is the cart as stored, without names or prices.
    #[error("External provider error after cart {} was saved: {reason}", .persisted.id)]
    ExternalAfterWrite { persisted: Box<Cart>, reason: String },

    /// The cache store could not be reached, or the deadline passed.
    #[error("Cart store unavailable: {0}")]
    StoreUnavailable(String),

    /// The cart could not be encoded or decoded.
    #[error("Cart serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of [`CartError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    UpstreamUnavailable,
    Internal,
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::CartNotFound(_)
            | CartError::ItemNotFound { .. }
            | CartError::ItemNotFoundOnProvider(_) => ErrorKind::NotFound,
            CartError::ItemAlreadyInCart { .. } | CartError::InvalidQuantity(_) => {
                ErrorKind::Conflict
            }
            CartError::External(_)
            | CartError::ExternalAfterWrite { .. }
            | CartError::StoreUnavailable(_) => ErrorKind::UpstreamUnavailable,
            CartError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status the transport layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::CartNotFound(_)
            | CartError::ItemNotFound { .. }
            | CartError::ItemNotFoundOnProvider(_) => 404,
            CartError::ItemAlreadyInCart { .. } | CartError::InvalidQuantity(_) => 422,
            CartError::External(_)
            | CartError::ExternalAfterWrite { .. }
            | CartError::StoreUnavailable(_)
            | CartError::Serialization(_) => 500,
        }
    }

    /// The stored cart, when the failure happened after a successful write.
    pub fn persisted_cart(&self) -> Option<&Cart> {
        match self {
            CartError::ExternalAfterWrite { persisted, .. } => Some(&**persisted),
            _ => None,
        }
    }
}
