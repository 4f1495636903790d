//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Verbosity comes from the `RUST_LOG` environment variable. The compact format
//! hides module paths (`with_target(false)`) and prints span fields inline.
//!
//! ```bash
//! RUST_LOG=info cargo run
//!
//! # Store and catalog round trips
//! RUST_LOG=debug cargo run
//!
//! # Only the orchestrator
//! RUST_LOG=cart_service::cart=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Cart operations**: one span per call, carrying `cart_id`, `item_id`,
//!   `quantity`, `correlation_id` and `version` as fields
//! - **Store calls**: key, payload size, hit/miss
//! - **Catalog calls**: URL, provider status, decode failures
//! - **Errors**: the underlying store or catalog error, logged once where it is translated
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO create_cart: Creating new cart cart_id="5f0c…" correlation_id="a1…" version="0.1.0"
//! INFO get_item: Fetching item from provider item_id="42" correlation_id="b2…" version="0.1.0"
//! ```
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG add_item: Getting cart from store cart_id="5f0c…" item_id="42" quantity=3
//! DEBUG add_item: Saving cart to store items=1
//! DEBUG add_item: Populating items from provider items=1
//! DEBUG add_item:get_item: Calling catalog provider url=https://…/products/42
//! ```

/// Initializes the tracing subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
