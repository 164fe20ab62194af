//! Per-service rate limiter backing the holder-enrichment API limiter
//! from spec §4.5.2: a per-second cap (Governor/GCRA, smooth pacing) and a
//! per-minute cap (sliding window, the harder ceiling) together, plus
//! exponential backoff on HTTP 429.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::adaptive::{ExponentialBackoff, SlidingWindowTracker};
use crate::rpc::types::RpcMethod;

/// Rate limiter for a single external service (chain RPC or enrichment API).
pub struct ServiceRateLimiter {
    service_id: String,

    per_second: GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_minute: SlidingWindowTracker,
    per_minute_cap: usize,

    backoff: ExponentialBackoff,
    consecutive_429s: AtomicU32,
    last_429: RwLock<Option<Instant>>,
}

impl ServiceRateLimiter {
    pub fn new(service_id: &str, per_second_cap: u32, per_minute_cap: u32) -> Self {
        let per_second = per_second_cap.max(1);
        Self {
            service_id: service_id.to_string(),
            per_second: GovernorLimiter::direct(Quota::per_second(
                NonZeroU32::new(per_second).unwrap(),
            )),
            per_minute: SlidingWindowTracker::new(Duration::from_secs(60), per_minute_cap as usize),
            per_minute_cap: per_minute_cap.max(1) as usize,
            backoff: ExponentialBackoff::new(Duration::from_millis(200), Duration::from_secs(30)),
            consecutive_429s: AtomicU32::new(0),
            last_429: RwLock::new(None),
        }
    }

    /// Block until both the per-second and per-minute budgets admit one more
    /// call of the given method, then record the call.
    pub async fn acquire(&self, method: RpcMethod) {
        // Back off entirely while we're in a post-429 cooldown.
        if self.consecutive_429s.load(Ordering::Relaxed) > 0 {
            let delay = self.backoff.calculate_delay(
                self.consecutive_429s.load(Ordering::Relaxed) as u64 - 1,
            );
            tokio::time::sleep(delay).await;
        }

        for _ in 0..method.cost().max(1) {
            self.per_second.until_ready().await;
        }

        loop {
            if self.per_minute.count() < self.per_minute_cap {
                self.per_minute.record();
                return;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Record a 429 response: trips the exponential backoff.
    pub async fn record_rate_limited(&self) {
        self.consecutive_429s.fetch_add(1, Ordering::SeqCst);
        *self.last_429.write().await = Some(Instant::now());
    }

    /// Record a successful call: resets the backoff.
    pub fn record_success(&self) {
        self.consecutive_429s.store(0, Ordering::SeqCst);
        self.backoff.reset();
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn minute_usage(&self) -> usize {
        self.per_minute.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn per_minute_cap_is_enforced_by_count() {
        let limiter = ServiceRateLimiter::new("enrich", 1000, 2);
        limiter.acquire(RpcMethod::GetBalance).await;
        limiter.acquire(RpcMethod::GetBalance).await;
        assert_eq!(limiter.minute_usage(), 2);
    }

    #[tokio::test]
    async fn rate_limited_then_success_resets_backoff() {
        let limiter = ServiceRateLimiter::new("enrich", 1000, 1000);
        limiter.record_rate_limited().await;
        assert_eq!(limiter.consecutive_429s.load(Ordering::SeqCst), 1);
        limiter.record_success();
        assert_eq!(limiter.consecutive_429s.load(Ordering::SeqCst), 0);
    }
}
