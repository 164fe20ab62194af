//! Core types shared by the chain-RPC and holder-enrichment clients.

use serde::{Deserialize, Serialize};

/// Circuit breaker state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Which external collaborator a call is going to. Both share the same
/// circuit-breaker/rate-limiter plumbing but have independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    ChainRpc,
    Enrich,
}

impl ServiceKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::ChainRpc => "chain_rpc",
            Self::Enrich => "enrich",
        }
    }
}

/// A single method call's relative cost, for weighting rate-limiter quota.
/// Chain RPC methods are treated as uniform cost; enrichment pagination
/// calls cost more per spec's credit model (see `score::holder::budget`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    GetAccountInfo,
    GetProgramAccounts,
    GetSignaturesForAddress,
    GetBalance,
}

impl RpcMethod {
    pub fn cost(&self) -> u32 {
        match self {
            Self::GetProgramAccounts => 5,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAccountInfo => "getAccountInfo",
            Self::GetProgramAccounts => "getProgramAccounts",
            Self::GetSignaturesForAddress => "getSignaturesForAddress",
            Self::GetBalance => "getBalance",
        }
    }
}
