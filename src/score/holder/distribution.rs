//! Holder sub-scores (spec §4.5.2): distribution, quality, activity, each
//! 0–111, summing to the 0–333 holder score total.

use crate::rpc::enrich::{HolderRecord, WalletHistory};

const SUB_SCORE_MAX: u32 = 111;

/// Standard discrete Gini coefficient over balances, 0 (perfectly equal) to
/// ~1 (maximally concentrated). Empty or single-holder input is defined as 0.
pub fn gini_coefficient(balances: &[u64]) -> f64 {
    if balances.len() < 2 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = balances.iter().map(|&b| b as f64).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len() as f64;
    let sum: f64 = sorted.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }
    let weighted: f64 = sorted.iter().enumerate().map(|(i, &b)| (i as f64 + 1.0) * b).sum();
    ((2.0 * weighted) / (n * sum) - (n + 1.0) / n).clamp(0.0, 1.0)
}

pub fn top1_pct_concentration(balances: &[u64]) -> f64 {
    if balances.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<u64> = balances.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let total: u64 = sorted.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let top_n = ((sorted.len() as f64 * 0.01).ceil() as usize).max(1);
    let top_sum: u64 = sorted.iter().take(top_n).sum();
    top_sum as f64 / total as f64 * 100.0
}

/// Lower Gini, lower top-1% concentration, and more distinct holders all
/// raise the score (spec §4.5.2's "Distribution score combines Gini
/// coefficient, top-1-% concentration, and holder count").
pub fn distribution_score(gini: f64, top1_pct: f64, holder_count: u64) -> u32 {
    let gini_component = (1.0 - gini.clamp(0.0, 1.0)) * 50.0;
    let concentration_component = (1.0 - (top1_pct / 100.0).clamp(0.0, 1.0)) * 40.0;
    let holder_count_component = ((holder_count as f64).log10().max(0.0) / 4.0 * 21.0).min(21.0);
    ((gini_component + concentration_component + holder_count_component).round() as u32).min(SUB_SCORE_MAX)
}

/// `histories` should already be the sampled subset; ratios are computed
/// over what was actually enriched, matching the budgeted-sample design.
pub fn quality_score(histories: &[WalletHistory]) -> u32 {
    if histories.is_empty() {
        return SUB_SCORE_MAX / 2;
    }
    let n = histories.len() as f64;
    let bot_ratio = histories.iter().filter(|h| h.is_known_bot).count() as f64 / n;
    let smart_money_ratio = histories.iter().filter(|h| h.is_smart_money).count() as f64 / n;
    let now = chrono::Utc::now().timestamp();
    let mean_age_days = histories.iter().map(|h| ((now - h.first_seen_unix).max(0) as f64) / 86_400.0).sum::<f64>() / n;

    let bot_component = (1.0 - bot_ratio) * 55.0;
    let smart_money_component = smart_money_ratio.min(0.2) * 5.0 * 28.0;
    let age_component = (mean_age_days / 180.0).clamp(0.0, 1.0) * 28.0;

    ((bot_component + smart_money_component + age_component).round() as u32).min(SUB_SCORE_MAX)
}

pub fn activity_score(active_holder_24h_ratio: f64, organic_growth_score: f64, velocity: f64) -> u32 {
    let active_component = active_holder_24h_ratio.clamp(0.0, 1.0) * 40.0;
    let growth_component = organic_growth_score.clamp(0.0, 1.0) * 41.0;
    let velocity_component = velocity.clamp(0.0, 1.0) * 30.0;
    ((active_component + growth_component + velocity_component).round() as u32).min(SUB_SCORE_MAX)
}

pub fn balances_of(holders: &[HolderRecord]) -> Vec<u64> {
    holders.iter().map(|h| h.balance).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gini_of_equal_balances_is_zero() {
        assert_eq!(gini_coefficient(&[100, 100, 100]), 0.0);
    }

    #[test]
    fn gini_of_single_whale_approaches_one() {
        let balances: Vec<u64> = (0..100).map(|i| if i == 0 { 99_000 } else { 10 }).collect();
        assert!(gini_coefficient(&balances) > 0.8);
    }

    #[test]
    fn top1_pct_matches_expected_share() {
        let balances = vec![900, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10];
        let pct = top1_pct_concentration(&balances);
        assert!(pct > 80.0);
    }

    #[test]
    fn quality_penalizes_bots() {
        let now = chrono::Utc::now().timestamp();
        let mostly_bots: Vec<WalletHistory> = (0..10)
            .map(|i| WalletHistory {
                wallet: format!("W{i}"),
                first_seen_unix: now - 86_400,
                is_known_bot: i < 8,
                is_smart_money: false,
                trade_count_30d: 1,
            })
            .collect();
        let mostly_human: Vec<WalletHistory> = mostly_bots
            .iter()
            .cloned()
            .map(|mut h| { h.is_known_bot = false; h })
            .collect();
        assert!(quality_score(&mostly_human) > quality_score(&mostly_bots));
    }
}
