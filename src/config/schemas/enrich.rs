use crate::errors::CoreError;

/// Holder-enrichment REST provider (spec §6).
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl EnrichConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            base_url: super::env_string("ENRICH_URL", "https://enrich.example.invalid"),
            api_key: std::env::var("ENRICH_KEY").ok(),
        })
    }

    pub fn for_tests() -> Self {
        Self { base_url: "http://localhost:9900".to_string(), api_key: Some("test-key".to_string()) }
    }
}
