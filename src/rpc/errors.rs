//! Error type returned by the chain-RPC and holder-enrichment clients.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum RpcError {
    RateLimited {
        service_id: String,
        retry_after: Option<Duration>,
    },
    Network {
        message: String,
        is_timeout: bool,
    },
    ServiceError {
        status: u16,
        message: String,
    },
    CircuitOpen {
        service_id: String,
        retry_after: Duration,
    },
    NotFound,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited { service_id, retry_after } => {
                write!(f, "{service_id} rate limited, retry_after={retry_after:?}")
            }
            Self::Network { message, is_timeout } => {
                write!(f, "network error (timeout={is_timeout}): {message}")
            }
            Self::ServiceError { status, message } => {
                write!(f, "service returned {status}: {message}")
            }
            Self::CircuitOpen { service_id, retry_after } => {
                write!(f, "circuit open for {service_id}, retry_after={retry_after:?}")
            }
            Self::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
            || matches!(self, Self::ServiceError { status, .. } if *status == 429)
    }
}
