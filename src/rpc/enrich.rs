//! Holder-enrichment REST client (spec §4.5.2, §6): per-mint holder
//! pagination and per-wallet history, credit-metered against the monthly
//! budget the holder analyzer tracks separately.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::rpc::circuit_breaker::CircuitBreakerRegistry;
use crate::rpc::errors::RpcError;
use crate::rpc::rate_limiter::RateLimiterRegistry;
use crate::rpc::types::{RpcMethod, ServiceKind};

#[derive(Debug, Clone, Deserialize)]
pub struct HolderRecord {
    pub wallet: String,
    pub balance: u64,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HolderPage {
    pub holders: Vec<HolderRecord>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    pub total_holders: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletHistory {
    // Clone is required by the wallet enrichment cache, which stores a copy
    // per tier alongside the live value returned to each caller.
    pub wallet: String,
    pub first_seen_unix: i64,
    #[serde(default)]
    pub is_known_bot: bool,
    #[serde(default)]
    pub is_smart_money: bool,
    #[serde(default)]
    pub trade_count_30d: u32,
}

pub struct EnrichClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    breakers: Arc<CircuitBreakerRegistry>,
    limiters: Arc<RateLimiterRegistry>,
}

impl EnrichClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        breakers: Arc<CircuitBreakerRegistry>,
        limiters: Arc<RateLimiterRegistry>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .expect("reqwest client builds"),
            base_url,
            api_key,
            breakers,
            limiters,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, RpcError> {
        let breaker = self.breakers.get_breaker(ServiceKind::Enrich).await;
        breaker.can_execute().await.map_err(|retry_after| RpcError::CircuitOpen {
            service_id: ServiceKind::Enrich.id().to_string(),
            retry_after,
        })?;

        let limiter = self.limiters.get(ServiceKind::Enrich).await;
        limiter.acquire(RpcMethod::GetAccountInfo).await;

        let mut request = self.http.get(format!("{}{}", self.base_url, path)).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request.send().await.map_err(|e| RpcError::Network {
            message: e.to_string(),
            is_timeout: e.is_timeout(),
        })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            breaker.record_failure("rate limited", true).await;
            limiter.record_rate_limited().await;
            return Err(RpcError::RateLimited {
                service_id: ServiceKind::Enrich.id().to_string(),
                retry_after: None,
            });
        }
        if status.as_u16() == 404 {
            breaker.record_success().await;
            limiter.record_success();
            return Err(RpcError::NotFound);
        }
        if !status.is_success() {
            breaker.record_failure(&status.to_string(), false).await;
            return Err(RpcError::ServiceError {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }

        let value = resp.json::<Value>().await.map_err(|e| RpcError::Network {
            message: e.to_string(),
            is_timeout: false,
        })?;
        breaker.record_success().await;
        limiter.record_success();
        Ok(value)
    }

    /// Fetch one page of holders for a mint, ordered by balance descending.
    pub async fn get_holders(
        &self,
        mint: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<HolderPage, RpcError> {
        let mut query: Vec<(&str, String)> = vec![("mint", mint.to_string()), ("limit", page_size.to_string())];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }
        let value = self.get("/v1/holders", &query).await?;
        serde_json::from_value(value).map_err(|e| RpcError::ServiceError {
            status: 200,
            message: format!("bad holder page payload: {e}"),
        })
    }

    /// Fetch enrichment history for a single wallet (bot/smart-money flags,
    /// first-seen timestamp, recent trade count).
    pub async fn get_wallet_history(&self, wallet: &str) -> Result<WalletHistory, RpcError> {
        let query = [("wallet", wallet.to_string())];
        let value = self.get("/v1/wallet-history", &query).await?;
        serde_json::from_value(value).map_err(|e| RpcError::ServiceError {
            status: 200,
            message: format!("bad wallet history payload: {e}"),
        })
    }
}
