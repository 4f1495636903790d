//! # Cart Service Demo
//!
//! Wires the cart system from flags and environment, reports health, and walks
//! one cart through its lifecycle.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --catalog-url https://bootcamp-products.getsandbox.com
//! ```

use cart_service::config::Config;
use cart_service::lifecycle::{setup_tracing, CartSystem};
use clap::Parser;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let config = Config::parse();

    info!(version = %config.service_version, "Starting cart service");

    let system = CartSystem::from_config(config)
        .await
        .map_err(|e| e.to_string())?;

    let health = system.health().await;
    info!(
        service = health.service,
        cache = health.cache,
        catalog = health.catalog,
        "Health report"
    );

    let ctx = system.context();
    let span = tracing::info_span!("cart_round_trip", correlation_id = %ctx.correlation_id);
    let outcome = async {
        let cart = system.service.create_cart(&ctx).await?;
        info!(cart_id = %cart.id, "Cart created");

        let loaded = system.service.get_cart(&ctx, &cart.id).await?;
        info!(cart_id = %loaded.id, items = loaded.items.len(), "Cart loaded");

        system.service.delete_cart(&ctx, &cart.id).await
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(()) => info!("Cart round trip completed"),
        Err(e) => error!(error = %e, status = e.status_code(), "Cart round trip failed"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
