//! Chain RPC and holder-enrichment collaborators: generic request/response
//! clients wrapped in a circuit breaker and a rate limiter, shared across
//! the reconciler and the holder score analyzer (spec §5, §6).

pub mod circuit_breaker;
pub mod client;
pub mod enrich;
pub mod errors;
pub mod rate_limiter;
pub mod types;

pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerRegistry};
pub use client::ChainRpcClient;
pub use enrich::EnrichClient;
pub use errors::RpcError;
pub use rate_limiter::RateLimiterRegistry;
pub use types::{CircuitState, RpcMethod, ServiceKind};

use std::sync::Arc;

/// Bundles the shared breaker/limiter plumbing both collaborators draw from.
pub struct RpcStack {
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub limiters: Arc<RateLimiterRegistry>,
    pub chain: ChainRpcClient,
    pub enrich: EnrichClient,
}

impl RpcStack {
    pub fn new(
        chain_rpc_url: String,
        enrich_base_url: String,
        enrich_api_key: Option<String>,
        chain_rpc_per_sec: u32,
        enrich_per_sec: u32,
        enrich_per_min: u32,
    ) -> Self {
        let breakers = Arc::new(CircuitBreakerRegistry::new());
        let limiters = Arc::new(RateLimiterRegistry::new(
            chain_rpc_per_sec,
            enrich_per_sec,
            enrich_per_min,
        ));
        let chain = ChainRpcClient::new(chain_rpc_url, breakers.clone(), limiters.clone());
        let enrich = EnrichClient::new(
            enrich_base_url,
            enrich_api_key,
            breakers.clone(),
            limiters.clone(),
        );
        Self { breakers, limiters, chain, enrich }
    }
}
