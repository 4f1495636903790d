//! Process configuration, read from command-line flags or the environment.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://bootcamp-products.getsandbox.com";

/// Settings for wiring a [`CartSystem`](crate::lifecycle::CartSystem).
#[derive(Debug, Clone, Parser)]
#[command(name = "cart-service", version, about = "Shopping carts on a cache store, priced by a catalog provider")]
pub struct Config {
    /// Redis address (`host:port` or `redis://...`). Without it carts live in process memory.
    #[arg(long, env = "REDIS_SERVER")]
    pub redis_url: Option<String>,

    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    /// Base URL of the catalog provider.
    #[arg(long, default_value = DEFAULT_CATALOG_URL, env = "CATALOG_URL")]
    pub catalog_url: String,

    /// Expiry applied to every cart write, in seconds. 0 keeps carts forever.
    #[arg(long, default_value_t = 0, env = "CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,

    /// Deadline for one cart operation, covering every store and catalog call it makes.
    #[arg(long, default_value_t = 5000, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Version reported in logs and health checks.
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"), env = "SERVICE_VERSION")]
    pub service_version: String,
}

impl Config {
    /// Redis connection URL, adding the `redis://` scheme to bare addresses.
    pub fn redis_url(&self) -> Option<String> {
        self.redis_url.as_deref().map(|url| {
            if url.contains("://") {
                url.to_string()
            } else {
                format!("redis://{url}")
            }
        })
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
