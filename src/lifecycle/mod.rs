//! # System Lifecycle & Wiring
//!
//! Builds the cart system from configuration, reports its health and shuts it
//! down.
//!
//! - [`CartSystem`] - owns the [`CartService`](crate::cart::CartService) and any background tasks
//! - [`HealthReport`] - service, cache and catalog liveness
//! - [`setup_tracing`] - initializes logging

pub mod cart_system;
pub mod tracing;

pub use cart_system::*;
pub use self::tracing::setup_tracing;
