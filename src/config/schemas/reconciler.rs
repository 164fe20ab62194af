use crate::errors::CoreError;

/// Reconciler batching and debounce cadence (spec §4.4, §6).
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub batch_size: usize,
    pub batch_timeout_ms: u64,
    pub pool_update_debounce_ms: u64,
    pub pool_match_window_secs: u64,
    pub id_cache_ttl_secs: u64,
    pub sol_usd_cache_ttl_secs: u64,
    pub sol_usd_fallback: f64,
}

impl ReconcilerConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            batch_size: super::env_u64("BATCH_SIZE", 50)? as usize,
            batch_timeout_ms: super::env_u64("BATCH_TIMEOUT_MS", 5000)?,
            pool_update_debounce_ms: super::env_u64("POOL_UPDATE_DEBOUNCE_MS", 5000)?,
            pool_match_window_secs: 3600,
            id_cache_ttl_secs: 300,
            sol_usd_cache_ttl_secs: 5,
            sol_usd_fallback: 165.0,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            batch_size: 50,
            batch_timeout_ms: 5000,
            pool_update_debounce_ms: 5000,
            pool_match_window_secs: 3600,
            id_cache_ttl_secs: 300,
            sol_usd_cache_ttl_secs: 5,
            sol_usd_fallback: 165.0,
        }
    }
}
