//! Circuit breaker for the two external services the holder analyzer and
//! chain-RPC client talk to (spec §6: "treat each collaborator as failing
//! fast once it trips"). Trimmed to exactly the states and transitions this
//! crate drives `can_execute`/`record_success`/`record_failure` through —
//! the teacher's generic multi-provider manager carried a much larger
//! surface (force_open/force_close, health listings, per-provider config
//! overrides) that nothing here calls.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::logger::{self, LogTag};
use crate::rpc::types::{CircuitState, ServiceKind};

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_duration: Duration,
    pub half_open_max_requests: u32,
    pub ignore_rate_limits: bool,
    pub min_state_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            open_duration: Duration::from_secs(30),
            half_open_max_requests: 2,
            ignore_rate_limits: true,
            min_state_duration: Duration::from_secs(5),
        }
    }
}

struct Inner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    half_open_requests: u32,
    opened_at: Option<Instant>,
    last_state_change: Instant,
}

/// One breaker per `ServiceKind`. `record_failure`/`record_success` drive
/// the closed → open → half-open → closed cycle; `can_execute` is the
/// gate every call in `ChainRpcClient`/`EnrichClient` checks first.
pub struct ServiceCircuitBreaker {
    service: ServiceKind,
    config: CircuitBreakerConfig,
    inner: RwLock<Inner>,
}

impl ServiceCircuitBreaker {
    fn new(service: ServiceKind, config: CircuitBreakerConfig) -> Self {
        Self {
            service,
            config,
            inner: RwLock::new(Inner {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                half_open_requests: 0,
                opened_at: None,
                last_state_change: Instant::now(),
            }),
        }
    }

    pub async fn can_execute(&self) -> Result<(), Duration> {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::HalfOpen => {
                if inner.half_open_requests < self.config.half_open_max_requests {
                    inner.half_open_requests += 1;
                    Ok(())
                } else {
                    Err(Duration::from_millis(100))
                }
            }
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(Duration::ZERO);
                if elapsed >= self.config.open_duration {
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    inner.half_open_requests = 1;
                    inner.last_state_change = Instant::now();
                    logger::info(LogTag::Rpc, &format!("{} circuit half-open, probing", self.service.id()));
                    Ok(())
                } else {
                    Err(self.config.open_duration - elapsed)
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::Closed => inner.failures = 0,
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                    inner.half_open_requests = 0;
                    inner.opened_at = None;
                    inner.last_state_change = Instant::now();
                    logger::info(LogTag::Rpc, &format!("{} circuit closed, recovered", self.service.id()));
                }
            }
            CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self, reason: &str, is_rate_limit: bool) {
        if is_rate_limit && self.config.ignore_rate_limits {
            return;
        }
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;
                if inner.failures >= self.config.failure_threshold
                    && inner.last_state_change.elapsed() >= self.config.min_state_duration
                {
                    self.trip(&mut inner, reason);
                }
            }
            CircuitState::HalfOpen => self.trip(&mut inner, reason),
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
        }
    }

    fn trip(&self, inner: &mut Inner, reason: &str) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.last_state_change = Instant::now();
        inner.successes = 0;
        inner.half_open_requests = 0;
        logger::warning(LogTag::Rpc, &format!("{} circuit open: {reason}", self.service.id()));
    }

    #[cfg(test)]
    async fn current_state(&self) -> CircuitState {
        self.inner.read().await.state
    }
}

/// Lazily-created breakers keyed by `ServiceKind`, mirroring
/// `RateLimiterRegistry`'s shape for the same two collaborators.
pub struct CircuitBreakerRegistry {
    chain_rpc: ServiceCircuitBreaker,
    enrich: ServiceCircuitBreaker,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self {
            chain_rpc: ServiceCircuitBreaker::new(ServiceKind::ChainRpc, CircuitBreakerConfig::default()),
            enrich: ServiceCircuitBreaker::new(ServiceKind::Enrich, CircuitBreakerConfig::default()),
        }
    }

    pub async fn get_breaker(&self, service: ServiceKind) -> &ServiceCircuitBreaker {
        match service {
            ServiceKind::ChainRpc => &self.chain_rpc,
            ServiceKind::Enrich => &self.enrich,
        }
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_allows_execution() {
        let breaker = ServiceCircuitBreaker::new(ServiceKind::ChainRpc, CircuitBreakerConfig::default());
        assert!(breaker.can_execute().await.is_ok());
        assert_eq!(breaker.current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn opens_after_failure_threshold() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            min_state_duration: Duration::from_millis(1),
            ..Default::default()
        };
        let breaker = ServiceCircuitBreaker::new(ServiceKind::Enrich, config);
        tokio::time::sleep(Duration::from_millis(5)).await;

        for _ in 0..3 {
            breaker.record_failure("service error", false).await;
        }

        assert_eq!(breaker.current_state().await, CircuitState::Open);
        assert!(breaker.can_execute().await.is_err());
    }

    #[tokio::test]
    async fn half_open_recovers_to_closed() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 2,
            open_duration: Duration::from_millis(10),
            min_state_duration: Duration::from_millis(1),
            half_open_max_requests: 5,
            ..Default::default()
        };
        let breaker = ServiceCircuitBreaker::new(ServiceKind::ChainRpc, config);
        tokio::time::sleep(Duration::from_millis(5)).await;

        breaker.record_failure("error", false).await;
        breaker.record_failure("error", false).await;
        assert_eq!(breaker.current_state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(15)).await;
        assert!(breaker.can_execute().await.is_ok());
        assert_eq!(breaker.current_state().await, CircuitState::HalfOpen);

        breaker.record_success().await;
        breaker.record_success().await;
        assert_eq!(breaker.current_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn rate_limit_failures_are_ignored_by_default() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            min_state_duration: Duration::from_millis(1),
            ..Default::default()
        };
        let breaker = ServiceCircuitBreaker::new(ServiceKind::Enrich, config);
        for _ in 0..10 {
            breaker.record_failure("rate limited", true).await;
        }
        assert_eq!(breaker.current_state().await, CircuitState::Closed);
    }
}
