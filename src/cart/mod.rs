//! Cart lifecycle and mutation rules.

pub mod error;
pub mod locks;
pub mod service;

pub use error::*;
pub use locks::{CartGuard, CartLocks};
pub use service::CartService;
