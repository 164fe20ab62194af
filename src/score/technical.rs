//! Technical score (spec §4.5.1): cheap, synchronous, recomputed on demand
//! from the latest pool state and the last hour of trades. Never persisted
//! row-per-event — only the latest value per token is meaningful, and that
//! "latest" is whatever the caller just computed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::store::{Transaction, TradeType};

const MARKET_CAP_SATURATION_USD: f64 = 1_000_000.0;
const MARKET_CAP_MAX: u32 = 100;
const BONDING_CURVE_MAX: u32 = 83;
const TRADING_HEALTH_MAX: u32 = 75;
const SELLOFF_RESPONSE_MAX: u32 = 75;
const LARGE_SELL_SOL_LAMPORTS: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnicalScore {
    pub market_cap: u32,
    pub bonding_curve: u32,
    pub trading_health: u32,
    pub selloff_response: u32,
}

impl TechnicalScore {
    pub fn total(&self) -> u32 {
        self.market_cap + self.bonding_curve + self.trading_health + self.selloff_response
    }
}

/// `marketCapUsd` is `latestPriceUsd * circulatingSupply`; the caller
/// supplies it pre-computed since supply scaling differs per venue.
pub fn market_cap_score(market_cap_usd: f64) -> u32 {
    let pct = (market_cap_usd / MARKET_CAP_SATURATION_USD).clamp(0.0, 1.0);
    (pct * MARKET_CAP_MAX as f64).round() as u32
}

/// Monotone non-decreasing in progress; 0 at 0%, 83 at 100% (spec §4.5.1).
pub fn bonding_curve_score(progress_pct: Option<f64>) -> u32 {
    let progress = progress_pct.unwrap_or(0.0).clamp(0.0, 100.0);
    ((progress / 100.0) * BONDING_CURVE_MAX as f64).round() as u32
}

/// `recent` is every trade in the last hour, any order. Rewards trade
/// volume and buyer diversity, penalizes a buy/sell ratio far from parity.
pub fn trading_health_score(recent: &[Transaction]) -> u32 {
    if recent.is_empty() {
        return 0;
    }

    let trade_count_score = (recent.len() as u32).min(30);

    let distinct_buyers: HashSet<&str> = recent
        .iter()
        .filter(|tx| tx.kind == TradeType::Buy)
        .map(|tx| tx.user.as_str())
        .collect();
    let buyer_score = (distinct_buyers.len() as u32).min(25);

    let buys = recent.iter().filter(|tx| tx.kind == TradeType::Buy).count();
    let sells = recent.iter().filter(|tx| tx.kind == TradeType::Sell).count();
    let ratio = buys as f64 / (buys + sells).max(1) as f64;
    let ratio_score = ((1.0 - (ratio - 0.5).abs() * 2.0).max(0.0) * 20.0).round() as u32;

    (trade_count_score + buyer_score + ratio_score).min(TRADING_HEALTH_MAX)
}

/// Penalizes unrecovered large sells (> 1 SOL), credits price recovery
/// afterward (spec §4.5.1). `recent` must be ordered oldest-first.
pub fn selloff_response_score(recent: &[Transaction]) -> u32 {
    const BASELINE: i32 = SELLOFF_RESPONSE_MAX as i32 / 2;
    let mut score = BASELINE;

    for (i, tx) in recent.iter().enumerate() {
        if tx.kind != TradeType::Sell || tx.sol_amount < LARGE_SELL_SOL_LAMPORTS {
            continue;
        }
        score -= 10;

        let Some(sell_price) = tx.price_per_token else { continue };
        let recovered = recent[i + 1..]
            .iter()
            .filter_map(|later| later.price_per_token)
            .any(|later_price| later_price >= sell_price);
        if recovered {
            score += 6;
        }
    }

    score.clamp(0, SELLOFF_RESPONSE_MAX as i32) as u32
}

pub fn compute(
    market_cap_usd: f64,
    bonding_curve_progress: Option<f64>,
    trades_last_hour: &[Transaction],
    now: DateTime<Utc>,
) -> TechnicalScore {
    let recent: Vec<Transaction> = trades_last_hour
        .iter()
        .filter(|tx| now.signed_duration_since(tx.block_time) <= chrono::Duration::hours(1))
        .cloned()
        .collect();

    TechnicalScore {
        market_cap: market_cap_score(market_cap_usd),
        bonding_curve: bonding_curve_score(bonding_curve_progress),
        trading_health: trading_health_score(&recent),
        selloff_response: selloff_response_score(&recent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TradeType, sol_amount: u64, price: Option<f64>, user: &str, secs_ago: i64) -> Transaction {
        Transaction {
            signature: format!("SIG-{secs_ago}-{user}"),
            block_time: Utc::now() - chrono::Duration::seconds(secs_ago),
            pool_id: 1,
            token_id: 1,
            slot: 0,
            kind,
            user: user.to_string(),
            sol_amount,
            token_amount: 1,
            price_per_token: price,
            pre_base_reserves: 0,
            pre_quote_reserves: 0,
            post_base_reserves: 0,
            post_quote_reserves: 0,
            fees: 0,
            raw_metadata: None,
        }
    }

    #[test]
    fn market_cap_saturates_at_one_million() {
        assert_eq!(market_cap_score(2_000_000.0), MARKET_CAP_MAX);
        assert_eq!(market_cap_score(0.0), 0);
    }

    #[test]
    fn bonding_curve_is_monotone() {
        assert_eq!(bonding_curve_score(Some(0.0)), 0);
        assert_eq!(bonding_curve_score(Some(100.0)), BONDING_CURVE_MAX);
        assert!(bonding_curve_score(Some(50.0)) < bonding_curve_score(Some(75.0)));
    }

    #[test]
    fn trading_health_rewards_balanced_activity() {
        let trades = vec![
            tx(TradeType::Buy, 1, Some(1.0), "A", 10),
            tx(TradeType::Sell, 1, Some(1.0), "B", 5),
        ];
        assert!(trading_health_score(&trades) > 0);
    }

    #[test]
    fn selloff_response_credits_recovery() {
        let trades = vec![
            tx(TradeType::Sell, LARGE_SELL_SOL_LAMPORTS, Some(1.0), "A", 100),
            tx(TradeType::Buy, 1, Some(1.2), "B", 50),
        ];
        let with_recovery = selloff_response_score(&trades);

        let no_recovery = vec![tx(TradeType::Sell, LARGE_SELL_SOL_LAMPORTS, Some(1.0), "A", 100)];
        let without_recovery = selloff_response_score(&no_recovery);

        assert!(with_recovery > without_recovery);
    }
}
