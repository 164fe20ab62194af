use crate::errors::CoreError;

/// Persistent store connection (spec §6).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_url: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self { db_url: super::env_string("DB_URL", "core_pipeline.db") })
    }

    pub fn for_tests() -> Self {
        Self { db_url: ":memory:".to_string() }
    }
}
