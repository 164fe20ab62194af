//! Centralized configuration, loaded once from the environment and cached
//! behind a global accessor (`with_config`), mirroring the teacher's
//! `load_config`/`with_config` shape but without the macro/TOML layer —
//! this domain's env surface (spec §6) is small and fixed.

pub mod schemas;

pub use schemas::{
    BackoffConfig, EnrichConfig, FeedConfig, HolderBudgetConfig, RateLimitConfig,
    ReconcilerConfig, RpcConfig, StoreConfig,
};

use once_cell::sync::OnceCell;

use crate::errors::CoreError;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub rpc: RpcConfig,
    pub enrich: EnrichConfig,
    pub store: StoreConfig,
    pub reconciler: ReconcilerConfig,
    pub holder_budget: HolderBudgetConfig,
    pub rate_limit: RateLimitConfig,
    pub backoff: BackoffConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            feed: FeedConfig::from_env()?,
            rpc: RpcConfig::from_env()?,
            enrich: EnrichConfig::from_env()?,
            store: StoreConfig::from_env()?,
            reconciler: ReconcilerConfig::from_env()?,
            holder_budget: HolderBudgetConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            backoff: BackoffConfig::from_env()?,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            feed: FeedConfig::for_tests(),
            rpc: RpcConfig::for_tests(),
            enrich: EnrichConfig::for_tests(),
            store: StoreConfig::for_tests(),
            reconciler: ReconcilerConfig::for_tests(),
            holder_budget: HolderBudgetConfig::for_tests(),
            rate_limit: RateLimitConfig::for_tests(),
            backoff: BackoffConfig::for_tests(),
        }
    }
}

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Loads configuration from the environment and stashes it globally. Must be
/// called exactly once, before any `with_config` call, typically at the top
/// of `main`.
pub fn load_config() -> Result<(), CoreError> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| CoreError::Config("load_config called more than once".to_string()))
}

/// Installs an in-memory test configuration. Safe to call repeatedly from
/// parallel tests; only the first call wins, matching production semantics.
pub fn load_config_for_tests() {
    let _ = CONFIG.set(Config::for_tests());
}

pub fn with_config<T>(f: impl FnOnce(&Config) -> T) -> T {
    let config = CONFIG
        .get()
        .expect("load_config (or load_config_for_tests) must run before with_config");
    f(config)
}

pub fn is_config_initialized() -> bool {
    CONFIG.get().is_some()
}
