//! Plain data types shared by the store, the catalog client and the cart service.

pub mod cart;
pub mod catalog;

pub use cart::*;
pub use catalog::*;
