//! Holder score analyzer (spec §4.5.2): the priority-queued, budgeted
//! background job that ties eligibility, sampling, the tiered wallet cache,
//! rate-limited enrichment, and sub-scoring together.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::HolderBudgetConfig;
use crate::logger::{self, LogTag};
use crate::rpc::enrich::{EnrichClient, WalletHistory};
use crate::score::technical;
use crate::store::{HolderScore, Store};

use super::alerts::{evaluate, AlertInputs};
use super::budget::CreditTracker;
use super::distribution::{activity_score, balances_of, distribution_score, gini_coefficient, quality_score, top1_pct_concentration};
use super::priority::{priority_of, Candidate};
use super::sampling::{sample, sample_size_for};
use super::wallet_cache::WalletCache;

const HOLDER_PAGE_SIZE: u32 = 200;
const MAX_PAGES_PER_TOKEN: u32 = 10;
const MIN_AGE_FOR_ELIGIBILITY_MINUTES: i64 = 30;
const MIN_TX_COUNT_FOR_ELIGIBILITY: u64 = 3;
/// No market-cap-in-USD figure is tracked at the store layer this analyzer
/// reads from, so the technical score fed into `priority_of`'s
/// instant-analysis gate omits the market-cap component (0 of its 100
/// points) rather than fabricate one; bonding curve + trading health +
/// selloff response alone can still clear `INSTANT_ANALYSIS_TECHNICAL_SCORE`.
const PRIORITY_MARKET_CAP_USD: f64 = 0.0;
/// Growth of at least this fraction since the last score is treated as
/// fully "organic" for the activity sub-score's growth component.
const ORGANIC_GROWTH_SATURATION_RATIO: f64 = 0.2;
/// Mean sampled-wallet 30-day trade count treated as full trading velocity.
const VELOCITY_SATURATION_TRADES: f64 = 10.0;

pub struct HolderAnalyzer {
    store: Arc<Store>,
    enrich: Arc<EnrichClient>,
    budget: CreditTracker,
    cache: Mutex<WalletCache>,
    previous_progress: Mutex<HashMap<i64, f64>>,
}

impl HolderAnalyzer {
    pub fn new(store: Arc<Store>, enrich: Arc<EnrichClient>, budget_config: HolderBudgetConfig) -> Self {
        Self {
            store,
            enrich,
            budget: CreditTracker::new(budget_config),
            cache: Mutex::new(WalletCache::new()),
            previous_progress: Mutex::new(HashMap::new()),
        }
    }

    pub fn credits_used(&self) -> u64 {
        self.budget.used()
    }

    /// Runs one pass over every eligible token, stopping early once the
    /// budget target band is reached (spec §4.5.2's "target usage band
    /// 50-75%" is a soft stop between cycles, the hard stop is enforced
    /// per-token inside `analyze_token`). Ordering follows
    /// `priority::priority_of`'s milestone > instant-analysis > stale >
    /// progress-descending tiers, using each token's progress from the
    /// previous cycle as the milestone-crossing baseline.
    pub async fn run_cycle(&self) {
        let min_age_cutoff = Utc::now() - chrono::Duration::minutes(MIN_AGE_FOR_ELIGIBILITY_MINUTES);
        let eligible = match self
            .store
            .get_holder_eligible_tokens(min_age_cutoff, MIN_TX_COUNT_FOR_ELIGIBILITY)
        {
            Ok(tokens) => tokens,
            Err(e) => {
                logger::error(LogTag::Holder, &format!("eligibility query failed: {e}"));
                return;
            }
        };

        let now = Utc::now();
        let mut queue: Vec<(i64, f64, super::priority::Priority)> = Vec::with_capacity(eligible.len());
        {
            let mut baselines = self.previous_progress.lock().await;
            for (token_id, progress) in eligible {
                let previous_progress = baselines.get(&token_id).copied().unwrap_or(progress);
                let priority = self.priority_for(token_id, progress, previous_progress, now);
                baselines.insert(token_id, progress);
                queue.push((token_id, progress, priority));
            }
        }
        queue.sort_by(|a, b| b.2.cmp(&a.2));

        for (token_id, _progress, _priority) in queue {
            if self.budget.is_above_target() {
                logger::info(LogTag::Budget, "holder budget target reached, deferring remaining tokens");
                break;
            }
            self.analyze_token(token_id).await;
        }
    }

    /// Builds the `priority_of` candidate from cheap, already-persisted
    /// state: the latest holder score row (for staleness and
    /// "has been scored before") and a technical score recomputed from the
    /// last hour of trades (for the instant-analysis gate).
    fn priority_for(
        &self,
        token_id: i64,
        progress: f64,
        previous_progress: f64,
        now: chrono::DateTime<Utc>,
    ) -> super::priority::Priority {
        let latest_score = self.store.get_latest_holder_score(token_id).ok().flatten();
        let trades_last_hour = self
            .store
            .get_transactions_since(token_id, now - chrono::Duration::hours(1))
            .unwrap_or_default();
        let technical = technical::compute(PRIORITY_MARKET_CAP_USD, Some(progress), &trades_last_hour, now);

        let candidate = Candidate {
            progress_pct: progress,
            technical_score: technical.total(),
            has_holder_score: latest_score.is_some(),
            last_scored_at: latest_score.as_ref().map(|s| s.score_time),
        };
        priority_of(&candidate, previous_progress, now)
    }

    async fn analyze_token(&self, token_id: i64) {
        if self.budget.is_at_hard_stop() {
            if self.budget.check_hard_stop_crossing() {
                logger::warning(LogTag::Budget, "creditWarning: monthly holder-enrichment budget hit its hard stop");
            }
            return;
        }

        let Ok(Some(token)) = self.store.get_token(token_id) else { return };
        let previous_score = self.store.get_latest_holder_score(token_id).ok().flatten();

        let mut holders = Vec::new();
        let mut cursor = None;
        for _ in 0..MAX_PAGES_PER_TOKEN {
            if self.budget.is_at_hard_stop() {
                if self.budget.check_hard_stop_crossing() {
                    logger::warning(LogTag::Budget, "creditWarning: monthly holder-enrichment budget hit its hard stop");
                }
                return;
            }
            let page = match self.enrich.get_holders(&token.mint_address, cursor.as_deref(), HOLDER_PAGE_SIZE).await {
                Ok(page) => page,
                Err(e) => {
                    logger::warning(LogTag::Enrich, &format!("holder page fetch failed for {}: {e}", token.mint_address));
                    break;
                }
            };
            let done = page.next_cursor.is_none();
            holders.extend(page.holders);
            cursor = page.next_cursor;
            if done {
                break;
            }
        }
        if holders.is_empty() {
            return;
        }
        holders.sort_by(|a, b| b.balance.cmp(&a.balance));

        let holder_count = holders.len() as u64;
        let sample_size = sample_size_for(holder_count);
        let mut rng_state = (token_id as u64).wrapping_mul(2654435761).wrapping_add(Utc::now().timestamp() as u64);
        let mut random01 = move || {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng_state >> 33) as f64) / (u32::MAX as f64)
        };
        let sampled: Vec<_> = sample(&holders, sample_size, &mut random01).into_iter().cloned().collect();

        let cost = CreditTracker::estimate_cost(holder_count, 0.5);
        if self.budget.try_charge(cost).is_err() {
            logger::warning(LogTag::Budget, &format!("hard stop reached, skipping holder analysis for {}", token.mint_address));
            if self.budget.check_hard_stop_crossing() {
                logger::warning(LogTag::Budget, "creditWarning: monthly holder-enrichment budget hit its hard stop");
            }
            return;
        }

        let mut histories = Vec::with_capacity(sampled.len());
        for holder in &sampled {
            histories.push(self.enrich_wallet(&holder.wallet).await);
        }

        let balances = balances_of(&holders);
        let gini = gini_coefficient(&balances);
        let top1 = top1_pct_concentration(&balances);
        let n = histories.len().max(1) as f64;
        let bot_ratio = histories.iter().filter(|h| h.is_known_bot).count() as f64 / n;
        let smart_money_ratio = histories.iter().filter(|h| h.is_smart_money).count() as f64 / n;

        let active_24h_ratio = histories.iter().filter(|h| h.trade_count_30d > 0).count() as f64 / n;
        let organic_growth = organic_growth_score(previous_score.as_ref().map(|s| s.holder_count), holder_count);
        let velocity = velocity_score(&histories);
        let activity = activity_score(active_24h_ratio, organic_growth, velocity);
        let distribution = distribution_score(gini, top1, holder_count);
        let quality = quality_score(&histories);
        let total = distribution + quality + activity;

        let score = HolderScore {
            token_id,
            score_time: Utc::now(),
            distribution_score: distribution,
            quality_score: quality,
            activity_score: activity,
            total_score: total,
            gini,
            top1_pct_concentration: top1,
            holder_count,
            bot_ratio,
            smart_money_ratio,
            credits_used: cost,
        };
        if let Err(e) = self.store.insert_holder_score(&score) {
            logger::error(LogTag::Holder, &format!("persist holder score for {token_id}: {e}"));
        }

        let alerts = evaluate(&AlertInputs {
            top1_pct_concentration: top1,
            gini,
            bot_ratio,
            smart_money_ratio,
            total_score: total,
        });
        for alert in alerts {
            logger::info(LogTag::Holder, &format!("{:?} alert for {}: {}", alert.severity, token.mint_address, alert.message));
        }
    }

    async fn enrich_wallet(&self, wallet: &str) -> WalletHistory {
        if let Some(cached) = self.cache.lock().await.get(wallet) {
            return cached;
        }
        if let Ok(Some(row)) = self.store.get_wallet_analysis(wallet) {
            let history = WalletHistory {
                wallet: wallet.to_string(),
                first_seen_unix: row.created_at.timestamp(),
                is_known_bot: row.is_bot,
                is_smart_money: row.is_smart_money,
                trade_count_30d: row.tx_count.min(u32::MAX as u64) as u32,
            };
            self.cache.lock().await.put(history.clone());
            return history;
        }

        match self.enrich.get_wallet_history(wallet).await {
            Ok(history) => {
                self.cache.lock().await.put(history.clone());
                self.persist_wallet_analysis(&history);
                history
            }
            Err(e) => {
                logger::warning(LogTag::Enrich, &format!("wallet history fetch failed for {wallet}: {e}"));
                WalletHistory {
                    wallet: wallet.to_string(),
                    first_seen_unix: Utc::now().timestamp(),
                    is_known_bot: false,
                    is_smart_money: false,
                    trade_count_30d: 0,
                }
            }
        }
    }

    fn persist_wallet_analysis(&self, history: &WalletHistory) {
        let now = Utc::now();
        let created_at = chrono::DateTime::from_timestamp(history.first_seen_unix, 0).unwrap_or(now);
        let age_days = now.signed_duration_since(created_at).num_seconds() as f64 / 86_400.0;
        let analysis = crate::store::WalletAnalysis {
            wallet_address: history.wallet.clone(),
            created_at,
            last_active: now,
            tx_count: history.trade_count_30d as u64,
            sol_balance: 0,
            wallet_age_days: age_days.max(0.0),
            is_bot: history.is_known_bot,
            is_smart_money: history.is_smart_money,
            risk_score: if history.is_known_bot { 0.9 } else { 0.1 },
            last_analyzed: now,
        };
        if let Err(e) = self.store.upsert_wallet_analysis(&analysis) {
            logger::warning(LogTag::Holder, &format!("persist wallet analysis for {}: {e}", history.wallet));
        }
    }
}

/// Growth in total holder count since the previous score, relative to the
/// previous count, saturating at `ORGANIC_GROWTH_SATURATION_RATIO`. A
/// first-ever score (no previous row) is treated as neutral growth.
fn organic_growth_score(previous_holder_count: Option<u64>, current_holder_count: u64) -> f64 {
    let Some(previous) = previous_holder_count.filter(|&p| p > 0) else { return 0.5 };
    let growth_ratio = (current_holder_count as f64 - previous as f64) / previous as f64;
    (growth_ratio.max(0.0) / ORGANIC_GROWTH_SATURATION_RATIO).clamp(0.0, 1.0)
}

/// Mean 30-day trade count across the sampled, enriched wallets, saturating
/// at `VELOCITY_SATURATION_TRADES`.
fn velocity_score(histories: &[WalletHistory]) -> f64 {
    if histories.is_empty() {
        return 0.0;
    }
    let mean_trades = histories.iter().map(|h| h.trade_count_30d as f64).sum::<f64>() / histories.len() as f64;
    (mean_trades / VELOCITY_SATURATION_TRADES).clamp(0.0, 1.0)
}

#[cfg(test)]
mod analyzer_helper_tests {
    use super::*;

    #[test]
    fn organic_growth_saturates_at_twenty_percent() {
        assert_eq!(organic_growth_score(Some(100), 120), 1.0);
        assert_eq!(organic_growth_score(Some(100), 110), 0.5);
        assert_eq!(organic_growth_score(Some(100), 90), 0.0);
    }

    #[test]
    fn organic_growth_is_neutral_with_no_prior_score() {
        assert_eq!(organic_growth_score(None, 50), 0.5);
    }

    #[test]
    fn velocity_saturates_at_ten_trades() {
        let histories = vec![
            WalletHistory { wallet: "A".into(), first_seen_unix: 0, is_known_bot: false, is_smart_money: false, trade_count_30d: 10 },
            WalletHistory { wallet: "B".into(), first_seen_unix: 0, is_known_bot: false, is_smart_money: false, trade_count_30d: 10 },
        ];
        assert_eq!(velocity_score(&histories), 1.0);
    }
}
