//! Generic JSON-RPC client for the chain RPC collaborator (spec §6).
//!
//! The on-chain RPC endpoint is treated as an opaque request/response
//! service offering four methods. Every call goes through the shared
//! circuit breaker and rate limiter so the holder analyzer and any
//! reconciliation scanner share one budget per spec §5 ("Shared resources").

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::logger::{self, LogTag};
use crate::rpc::circuit_breaker::CircuitBreakerRegistry;
use crate::rpc::errors::RpcError;
use crate::rpc::rate_limiter::RateLimiterRegistry;
use crate::rpc::types::{RpcMethod, ServiceKind};

/// Minimal on-chain account representation returned by `getAccountInfo`.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub owner: String,
    pub lamports: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: bool,
}

pub struct ChainRpcClient {
    http: reqwest::Client,
    url: String,
    breakers: Arc<CircuitBreakerRegistry>,
    limiters: Arc<RateLimiterRegistry>,
}

impl ChainRpcClient {
    pub fn new(
        url: String,
        breakers: Arc<CircuitBreakerRegistry>,
        limiters: Arc<RateLimiterRegistry>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("reqwest client builds"),
            url,
            breakers,
            limiters,
        }
    }

    async fn call(&self, method: RpcMethod, params: Value) -> Result<Value, RpcError> {
        let breaker = self.breakers.get_breaker(ServiceKind::ChainRpc).await;
        breaker.can_execute().await.map_err(|retry_after| RpcError::CircuitOpen {
            service_id: ServiceKind::ChainRpc.id().to_string(),
            retry_after,
        })?;

        let limiter = self.limiters.get(ServiceKind::ChainRpc).await;
        limiter.acquire(method).await;

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method.name(),
            "params": params,
        });

        let resp = self.http.post(&self.url).json(&body).send().await.map_err(|e| RpcError::Network {
            message: e.to_string(),
            is_timeout: e.is_timeout(),
        })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            breaker.record_failure("rate limited", true).await;
            limiter.record_rate_limited().await;
            return Err(RpcError::RateLimited {
                service_id: ServiceKind::ChainRpc.id().to_string(),
                retry_after: None,
            });
        }
        if !status.is_success() {
            breaker.record_failure(&status.to_string(), false).await;
            return Err(RpcError::ServiceError {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }

        let value: Value = resp.json().await.map_err(|e| RpcError::Network {
            message: e.to_string(),
            is_timeout: false,
        })?;

        breaker.record_success().await;
        limiter.record_success();

        if let Some(error) = value.get("error") {
            return Err(RpcError::ServiceError {
                status: 200,
                message: error.to_string(),
            });
        }
        Ok(value.get("result").cloned().unwrap_or(Value::Null))
    }

    pub async fn get_account_info(&self, pubkey: &str) -> Result<Option<AccountInfo>, RpcError> {
        let result = self
            .call(
                RpcMethod::GetAccountInfo,
                json!([pubkey, {"encoding": "base64"}]),
            )
            .await?;
        Ok(parse_account_info(&result))
    }

    pub async fn get_program_accounts(
        &self,
        program_id: &str,
        filters: Value,
    ) -> Result<Vec<(String, AccountInfo)>, RpcError> {
        let result = self
            .call(
                RpcMethod::GetProgramAccounts,
                json!([program_id, {"encoding": "base64", "filters": filters}]),
            )
            .await?;
        let mut out = Vec::new();
        if let Some(items) = result.as_array() {
            for item in items {
                if let (Some(pubkey), Some(account)) = (
                    item.get("pubkey").and_then(Value::as_str),
                    item.get("account"),
                ) {
                    if let Some(info) = parse_account_info(account) {
                        out.push((pubkey.to_string(), info));
                    }
                }
            }
        }
        Ok(out)
    }

    pub async fn get_signatures_for_address(
        &self,
        pubkey: &str,
        limit: u32,
    ) -> Result<Vec<SignatureInfo>, RpcError> {
        let result = self
            .call(
                RpcMethod::GetSignaturesForAddress,
                json!([pubkey, {"limit": limit}]),
            )
            .await?;
        let mut out = Vec::new();
        if let Some(items) = result.as_array() {
            for item in items {
                if let Some(signature) = item.get("signature").and_then(Value::as_str) {
                    out.push(SignatureInfo {
                        signature: signature.to_string(),
                        slot: item.get("slot").and_then(Value::as_u64).unwrap_or(0),
                        block_time: item.get("blockTime").and_then(Value::as_i64),
                        err: !item.get("err").map(Value::is_null).unwrap_or(true),
                    });
                }
            }
        }
        Ok(out)
    }

    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, RpcError> {
        let result = self.call(RpcMethod::GetBalance, json!([pubkey])).await?;
        Ok(result.get("value").and_then(Value::as_u64).unwrap_or(0))
    }

    pub async fn try_deserialize<T: DeserializeOwned>(&self, value: &Value) -> Option<T> {
        serde_json::from_value(value.clone()).ok()
    }
}

fn parse_account_info(value: &Value) -> Option<AccountInfo> {
    let value = value.get("value").unwrap_or(value);
    if value.is_null() {
        return None;
    }
    let owner = value.get("owner")?.as_str()?.to_string();
    let lamports = value.get("lamports").and_then(Value::as_u64).unwrap_or(0);
    let data_field = value.get("data")?;
    let raw = data_field.get(0).and_then(Value::as_str).unwrap_or("");
    let data = base64_decode(raw).unwrap_or_default();
    Some(AccountInfo { owner, lamports, data })
}

fn base64_decode(s: &str) -> Option<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}

pub fn log_rpc_error(tag: &str, err: &RpcError) {
    logger::warning(LogTag::Rpc, &format!("{tag}: {err}"));
}
