use crate::errors::CoreError;

/// Enrichment rate limiter caps (spec §4.5.2, §6).
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    pub per_second: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            per_minute: super::env_u64("RATE_PER_MIN", 600)? as u32,
            per_second: super::env_u64("RATE_PER_SEC", 10)? as u32,
        })
    }

    pub fn for_tests() -> Self {
        Self { per_minute: 600, per_second: 10 }
    }
}
