//! One plain struct per configuration concern, each with `from_env()` and
//! `for_tests()`. No macro layer: the set of env vars is small and fixed
//! (spec §6), so a hand-written struct per module reads better than a
//! generated one.

pub mod backoff;
pub mod enrich;
pub mod feed;
pub mod holder_budget;
pub mod rate_limit;
pub mod reconciler;
pub mod rpc;
pub mod store;

pub use backoff::BackoffConfig;
pub use enrich::EnrichConfig;
pub use feed::FeedConfig;
pub use holder_budget::HolderBudgetConfig;
pub use rate_limit::RateLimitConfig;
pub use reconciler::ReconcilerConfig;
pub use rpc::RpcConfig;
pub use store::StoreConfig;

use crate::errors::CoreError;

pub(crate) fn require_env(name: &str) -> Result<String, CoreError> {
    std::env::var(name).map_err(|_| CoreError::Config(format!("missing required env var {name}")))
}

pub(crate) fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn env_u64(name: &str, default: u64) -> Result<u64, CoreError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| CoreError::Config(format!("{name}={raw} is not a valid integer: {e}"))),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_f64(name: &str, default: f64) -> Result<f64, CoreError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<f64>()
            .map_err(|e| CoreError::Config(format!("{name}={raw} is not a valid number: {e}"))),
        Err(_) => Ok(default),
    }
}
