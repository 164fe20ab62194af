//! Rate limiting for the two external services the holder analyzer talks
//! to (chain RPC, holder enrichment): per-second GCRA pacing, a per-minute
//! sliding-window ceiling, and exponential backoff on 429.

pub mod adaptive;
pub mod provider;

pub use adaptive::{ExponentialBackoff, SlidingWindowTracker};
pub use provider::ServiceRateLimiter;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::rpc::types::ServiceKind;

/// Holds one `ServiceRateLimiter` per external service, created lazily with
/// the caps configured for that service.
pub struct RateLimiterRegistry {
    limiters: RwLock<HashMap<&'static str, Arc<ServiceRateLimiter>>>,
    per_second_caps: HashMap<&'static str, u32>,
    per_minute_caps: HashMap<&'static str, u32>,
}

impl RateLimiterRegistry {
    pub fn new(chain_rpc_per_sec: u32, enrich_per_sec: u32, enrich_per_min: u32) -> Self {
        let mut per_second_caps = HashMap::new();
        per_second_caps.insert(ServiceKind::ChainRpc.id(), chain_rpc_per_sec);
        per_second_caps.insert(ServiceKind::Enrich.id(), enrich_per_sec);

        let mut per_minute_caps = HashMap::new();
        per_minute_caps.insert(ServiceKind::ChainRpc.id(), chain_rpc_per_sec.saturating_mul(60));
        per_minute_caps.insert(ServiceKind::Enrich.id(), enrich_per_min);

        Self {
            limiters: RwLock::new(HashMap::new()),
            per_second_caps,
            per_minute_caps,
        }
    }

    pub async fn get(&self, kind: ServiceKind) -> Arc<ServiceRateLimiter> {
        let id = kind.id();
        {
            let limiters = self.limiters.read().await;
            if let Some(limiter) = limiters.get(id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().await;
        if let Some(limiter) = limiters.get(id) {
            return limiter.clone();
        }

        let per_second = *self.per_second_caps.get(id).unwrap_or(&10);
        let per_minute = *self.per_minute_caps.get(id).unwrap_or(&600);
        let limiter = Arc::new(ServiceRateLimiter::new(id, per_second, per_minute));
        limiters.insert(id, limiter.clone());
        limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_reuses_limiter_per_service() {
        let registry = RateLimiterRegistry::new(10, 10, 600);
        let a = registry.get(ServiceKind::Enrich).await;
        let b = registry.get(ServiceKind::Enrich).await;
        assert_eq!(a.service_id(), b.service_id());
        assert!(Arc::ptr_eq(&a, &b));
    }
}
