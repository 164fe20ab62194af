//! The shared write path (spec §4.4): resolves ids via a tiered cache,
//! upserts entities idempotently, batches trade appends, debounces pool
//! state writes, and links graduated tokens to their new pool.

pub mod batch;
pub mod cache;
pub mod pool_debounce;
pub mod sol_price_cache;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::ReconcilerConfig;
use crate::decode::types::{NormalizedRecord, TargetAmm};
use crate::logger::{self, LogTag};
use crate::metrics::Counters;
use crate::store::{PoolReservesUpdate, PoolStatus, Store, TokenUpdate, Transaction, Venue};

use batch::TradeBatcher;
use cache::{IdCache, ResolvedIds};
use pool_debounce::PoolDebouncer;
use sol_price_cache::SolUsdCache;

pub struct Reconciler {
    store: Arc<Store>,
    config: ReconcilerConfig,
    id_cache: IdCache,
    sol_price: SolUsdCache,
    pool_debounce: PoolDebouncer,
    counters: Arc<Counters>,
    /// One batcher per consumer queue (spec §4.4: "per-consumer batch"), so
    /// a slow-flushing venue never delays another's ordering.
    batchers: Mutex<HashMap<String, Arc<TradeBatcher>>>,
}

impl Reconciler {
    pub fn new(store: Arc<Store>, config: ReconcilerConfig, counters: Arc<Counters>) -> Self {
        let id_cache = IdCache::new(Duration::from_secs(config.id_cache_ttl_secs));
        let sol_price =
            SolUsdCache::new(Duration::from_secs(config.sol_usd_cache_ttl_secs), config.sol_usd_fallback);
        let pool_debounce = PoolDebouncer::new(Duration::from_millis(config.pool_update_debounce_ms));
        Self {
            store,
            config,
            id_cache,
            sol_price,
            pool_debounce,
            counters,
            batchers: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `(mintAddress, poolAddress?)` to `(tokenId, poolId)` (spec
    /// §4.4): cache hit first, then store lookup with the oldest-pool
    /// fallback, `None` on unknown token/pool (never synthesises a token).
    pub async fn resolve_ids(
        &self,
        mint_address: &str,
        pool_address: Option<&str>,
    ) -> Option<ResolvedIds> {
        if let Some(ids) = self.id_cache.get(mint_address).await {
            return Some(ids);
        }

        let token = self.store.get_token_by_mint(mint_address).ok().flatten()?;
        let pool = match pool_address {
            Some(addr) => self.store.get_pool_by_address(addr).ok().flatten(),
            None => self.store.get_oldest_pool_for_token(token.id).ok().flatten(),
        }?;

        let ids = ResolvedIds { token_id: token.id, pool_id: pool.id };
        self.id_cache.put(mint_address, ids).await;
        Some(ids)
    }

    async fn batcher_for(&self, queue: &str) -> Arc<TradeBatcher> {
        let mut batchers = self.batchers.lock().await;
        batchers
            .entry(queue.to_string())
            .or_insert_with(|| {
                Arc::new(TradeBatcher::new(
                    self.config.batch_size,
                    Duration::from_millis(self.config.batch_timeout_ms),
                ))
            })
            .clone()
    }

    /// `queue` names the owning consumer (spec §4.4: "per-consumer batch"),
    /// keeping each venue's trade ordering isolated from the others.
    pub async fn handle(&self, queue: &str, record: NormalizedRecord) {
        match record {
            NormalizedRecord::TokenCreated(created) => {
                match self.store.upsert_token(
                    &created.mint,
                    "",
                    "",
                    crate::decode::constants::DEFAULT_TOKEN_DECIMALS,
                    created.venue,
                    &created.creation_sig,
                    Utc::now(),
                    &created.creator,
                ) {
                    Ok(_) => {}
                    Err(e) => logger::error(LogTag::Reconciler, &format!("upsert token {}: {e}", created.mint)),
                }
            }
            NormalizedRecord::PoolCreated(created) => {
                let Ok(Some(token)) = self.store.get_token_by_mint(&created.base_mint) else {
                    self.counters.incr_unresolved_id();
                    logger::warning(LogTag::Reconciler, &format!("pool created for unknown mint {}", created.base_mint));
                    return;
                };
                match self.store.upsert_pool(
                    &created.pool_address,
                    token.id,
                    &created.base_mint,
                    &created.quote_mint,
                    created.venue,
                ) {
                    Ok(pool_id) => {
                        self.id_cache
                            .put(&created.base_mint, ResolvedIds { token_id: token.id, pool_id })
                            .await;
                    }
                    Err(e) => {
                        self.counters.incr_invariant_violation();
                        logger::error(LogTag::Reconciler, &format!("upsert pool {}: {e}", created.pool_address));
                    }
                }
            }
            NormalizedRecord::TradeRecord(trade) => {
                let Some(ids) = self.resolve_ids(&trade.mint, Some(&trade.pool_address)).await else {
                    self.counters.incr_unresolved_id();
                    logger::warning(LogTag::Reconciler, &format!("trade for unresolved mint {}", trade.mint));
                    return;
                };
                let price_per_token = crate::decode::price::price_from_reserves(
                    trade.post_base_reserves,
                    trade.post_quote_reserves,
                    crate::decode::constants::DEFAULT_TOKEN_DECIMALS,
                    crate::decode::constants::SOL_DECIMALS,
                );
                let tx = Transaction {
                    signature: trade.signature,
                    block_time: trade.block_time,
                    pool_id: ids.pool_id,
                    token_id: ids.token_id,
                    slot: trade.slot,
                    kind: trade.kind,
                    user: trade.user,
                    sol_amount: trade.sol_amount,
                    token_amount: trade.token_amount,
                    price_per_token,
                    pre_base_reserves: trade.pre_base_reserves,
                    pre_quote_reserves: trade.pre_quote_reserves,
                    post_base_reserves: trade.post_base_reserves,
                    post_quote_reserves: trade.post_quote_reserves,
                    fees: trade.metadata.fees,
                    raw_metadata: trade.metadata.raw,
                };
                let batcher = self.batcher_for(queue).await;
                if let Some(batch) = batcher.push(tx).await {
                    self.flush_batch(batch).await;
                }
            }
            NormalizedRecord::PoolStateUpdate(update) => {
                let usd_price = if update.latest_price.is_some() {
                    Some(self.sol_price.get(&self.store).await)
                } else {
                    None
                };
                let latest_price_usd =
                    match (update.latest_price, usd_price) {
                        (Some(price), Some(sol_usd)) => Some(price * sol_usd),
                        _ => None,
                    };
                self.pool_debounce
                    .stage(
                        &update.pool_address,
                        PoolReservesUpdate {
                            virtual_base_reserves: update.virtual_base_reserves,
                            virtual_quote_reserves: update.virtual_quote_reserves,
                            real_base_reserves: update.real_base_reserves,
                            real_quote_reserves: update.real_quote_reserves,
                            latest_price: update.latest_price,
                            latest_price_usd,
                            bonding_curve_progress: update.bonding_curve_progress,
                            status: None,
                        },
                    )
                    .await;
                self.counters.incr_pool_state_update();
            }
            NormalizedRecord::BondingCurveComplete(complete) => {
                logger::info(
                    LogTag::Reconciler,
                    &format!("bonding curve {} complete", complete.bonding_curve_address),
                );
            }
            NormalizedRecord::Graduated(graduated) => {
                self.handle_graduation(graduated).await;
            }
            NormalizedRecord::PriceUpdate(update) => {
                let sol_usd = self.sol_price.get(&self.store).await;
                let latest_price_usd = update.price.map(|p| p * sol_usd);
                self.pool_debounce
                    .stage(
                        &update.pool_address,
                        PoolReservesUpdate {
                            latest_price: update.price,
                            latest_price_usd,
                            ..Default::default()
                        },
                    )
                    .await;
            }
        }
    }

    async fn handle_graduation(&self, graduated: crate::decode::types::Graduated) {
        let Ok(Some(token)) = self.store.get_token_by_mint(&graduated.mint) else {
            self.counters.incr_unresolved_id();
            logger::warning(LogTag::Reconciler, &format!("graduation for unknown mint {}", graduated.mint));
            return;
        };

        if let Err(e) = self.store.mark_token_graduated(token.id, &graduated.graduation_sig, Utc::now()) {
            logger::error(LogTag::Reconciler, &format!("mark graduated {}: {e}", graduated.mint));
            return;
        }

        let target_venue = match graduated.target_amm {
            TargetAmm::Raydium => Venue::Raydium,
            TargetAmm::PumpSwap => Venue::PumpSwap,
            TargetAmm::PumpFun => Venue::PumpFun,
        };

        let since = Utc::now() - chrono::Duration::seconds(self.config.pool_match_window_secs as i64);
        if let Ok(pools) = self.store.get_pools_for_token_since(token.id, since) {
            if let Some(pool) = pools.into_iter().find(|p| p.venue == target_venue) {
                let _ = self.store.mark_pool_graduated(pool.id);
            } else {
                logger::debug(
                    LogTag::Reconciler,
                    &format!("no matching pool for {} graduation yet, will link when it appears", graduated.mint),
                );
            }
        }
    }

    async fn flush_batch(&self, batch: Vec<Transaction>) {
        match self.store.append_transaction_batch(&batch) {
            Ok(inserted) => self.counters.add_transactions_appended(inserted as u64),
            Err(e) => logger::error(LogTag::Reconciler, &format!("append transaction batch: {e}")),
        }
    }

    /// Flushes every pool update whose debounce interval has elapsed, and
    /// every trade batch whose flush timeout has elapsed; called from a
    /// periodic tick owned by the orchestrator.
    pub async fn flush_due_pool_updates(&self) {
        for (pool_address, update) in self.pool_debounce.drain_due().await {
            if let Err(e) = self.store.update_pool_reserves(&pool_address, &update) {
                logger::error(LogTag::Reconciler, &format!("update pool {pool_address}: {e}"));
            }
        }
    }

    /// Flushes every per-queue trade batcher whose flush timeout has
    /// elapsed, even if it isn't full yet; called from the same periodic
    /// tick as `flush_due_pool_updates`.
    pub async fn flush_due_batches(&self) {
        let batchers: Vec<Arc<TradeBatcher>> = self.batchers.lock().await.values().cloned().collect();
        for batcher in batchers {
            if let Some(batch) = batcher.flush_if_due().await {
                self.flush_batch(batch).await;
            }
        }
    }

    /// Best-effort final flush used by the shutdown sequence's batch-flush
    /// phase; drains every pool debounce entry and every trade batcher, and
    /// drops nothing silently but does not retry on failure.
    pub async fn flush_all(&self) {
        for (pool_address, update) in self.pool_debounce.drain_all().await {
            if let Err(e) = self.store.update_pool_reserves(&pool_address, &update) {
                logger::warning(LogTag::Reconciler, &format!("final flush of pool {pool_address} failed: {e}"));
            }
        }

        let batchers: Vec<Arc<TradeBatcher>> = self.batchers.lock().await.values().cloned().collect();
        for batcher in batchers {
            let batch = batcher.drain().await;
            if !batch.is_empty() {
                self.flush_batch(batch).await;
            }
        }
    }
}

pub use cache::ResolvedIds as ReconcilerResolvedIds;
