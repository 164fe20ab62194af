use crate::errors::CoreError;

/// Exponential reconnect policy shared by the feed pool and consumers.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
}

impl BackoffConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            initial_ms: super::env_u64("CONSUMER_BACKOFF_MS_INITIAL", 1000)?,
            max_ms: super::env_u64("CONSUMER_BACKOFF_MS_MAX", 30000)?,
        })
    }

    pub fn for_tests() -> Self {
        Self { initial_ms: 1000, max_ms: 30000 }
    }

    /// Doubles `attempt` times from `initial_ms`, capped at `max_ms`, with up
    /// to 20% jitter so reconnecting consumers don't thunder in lockstep.
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let exp = self.initial_ms.saturating_mul(1u64 << attempt.min(20));
        let capped = exp.min(self.max_ms);
        let jitter = (capped as f64 * 0.2 * rand::random::<f64>()) as u64;
        std::time::Duration::from_millis(capped.saturating_sub(jitter / 2).saturating_add(jitter / 2))
    }
}
