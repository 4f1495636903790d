//! # Cart Service
//!
//! > **Shopping carts kept in a cache store, priced live by a catalog provider.**
//!
//! Every cart operation loads the cart from the store, changes it in memory,
//! writes it back, and then fills in item names and prices by asking the
//! catalog provider. The store only remembers *which* items are in a cart and
//! *how many*; the catalog is the source of truth for everything else.
//!
//! ## 🏗️ Design Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each component defines its own error type (`StoreError`, `CatalogError`, `CartError`).
//! Store and catalog errors are translated at the [`CartService`](cart::CartService)
//! boundary, and [`CartError::status_code`](cart::CartError::status_code) gives the
//! stable HTTP status for each failure.
//!
//! ### 2. Explicit Request Context
//! Each operation takes a [`RequestContext`](context::RequestContext) with a correlation id
//! and a deadline. The deadline bounds every store and catalog call made for the request,
//! and the correlation id is forwarded to the catalog provider.
//!
//! ### 3. Concurrency Model
//! Requests run as independent Tokio tasks. Mutations of the same cart are serialized by
//! a per-cart lock inside the service, so concurrent writers cannot lose each other's
//! changes. Enrichment lookups for one cart run concurrently and fail fast.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! [`Cart`](model::Cart), [`CartItem`](model::CartItem) and [`CatalogItem`](model::CatalogItem).
//!
//! ### 2. The Store ([`store`])
//! The [`CacheBackend`](store::CacheBackend) trait, the typed [`CacheStore`](store::CacheStore)
//! extension, and two backends: [`RedisStore`](store::RedisStore) and the in-process
//! [`MemoryStore`](store::MemoryStore).
//!
//! ### 3. The Catalog ([`catalog`])
//! The [`CatalogClient`](catalog::CatalogClient) trait, the HTTP client, and
//! [`MockCatalog`](catalog::mock::MockCatalog) for tests.
//!
//! ### 4. The Orchestrator ([`cart`])
//! [`CartService`](cart::CartService): cart lifecycle, item rules, enrichment.
//!
//! ### 5. The Wiring ([`lifecycle`], [`config`])
//! [`CartSystem`](lifecycle::CartSystem) builds everything from a [`Config`](config::Config)
//! and aggregates health.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # In-process store, default catalog provider
//! RUST_LOG=info cargo run
//!
//! # Redis-backed
//! REDIS_SERVER=localhost:6379 RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod context;
pub mod lifecycle;
pub mod model;
pub mod store;
