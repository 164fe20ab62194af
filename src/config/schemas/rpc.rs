use crate::errors::CoreError;

/// Generic chain JSON-RPC endpoint (spec §6).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
}

impl RpcConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self { url: super::require_env("RPC_URL")? })
    }

    pub fn for_tests() -> Self {
        Self { url: "http://localhost:8899".to_string() }
    }
}
