//! Error taxonomy for the ingestion/derivation pipeline.
//!
//! One variant per failure kind in the error-handling design: each carries
//! enough context to log usefully, and each maps to exactly one resolution
//! policy (retry, requeue, drop-with-counter, pause, or fatal exit).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Stream closed, RPC timeout, DB deadlock — caller reconnects/retries.
    #[error("transient: {0}")]
    Transient(String),

    /// 429 from enrichment or chain RPC — limiter backs off, work is re-queued.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Unknown instruction / missing field — record dropped, counter bumped.
    #[error("decode skip: {0}")]
    DecodeSkip(String),

    /// Race on upsert or re-delivered transaction — re-read winner, benign.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Trade references an unknown mint/pool — row dropped with a warning.
    #[error("referential miss: {0}")]
    ReferentialMiss(String),

    /// Monthly credit usage crossed the hard-stop threshold.
    #[error("budget exhausted: {0}")]
    BudgetExhausted(String),

    /// Venue mismatch on upsert or similar fatal data inconsistency.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Unparsable env, DB unreachable at start — process exits non-zero.
    #[error("config error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::InvariantViolation(_) | CoreError::Config(_))
    }

    /// Process exit code this error should surface as, if it reaches `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Config(_) => 1,
            CoreError::InvariantViolation(_) => 1,
            _ => 0,
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                CoreError::DuplicateKey(err.to_string())
            }
            _ => CoreError::Transient(format!("sqlite: {err}")),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoreError::Transient(format!("request timed out: {err}"))
        } else {
            CoreError::Transient(format!("request failed: {err}"))
        }
    }
}

impl From<crate::rpc::RpcError> for CoreError {
    fn from(err: crate::rpc::RpcError) -> Self {
        if err.is_rate_limit() {
            CoreError::RateLimited(err.to_string())
        } else {
            CoreError::Transient(err.to_string())
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
