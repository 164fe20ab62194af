//! Monthly credit budget (spec §4.5.2): target usage band 50–75% of the
//! cap, hard stop at 85%. The tracker only counts; resetting the month is
//! the caller's responsibility (not modeled here — out of scope per spec
//! §1's non-goals around historical backfill).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::config::HolderBudgetConfig;

pub struct CreditTracker {
    config: HolderBudgetConfig,
    used: AtomicU64,
    hard_stop_warned: AtomicBool,
}

impl CreditTracker {
    pub fn new(config: HolderBudgetConfig) -> Self {
        Self { config, used: AtomicU64::new(0), hard_stop_warned: AtomicBool::new(false) }
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }

    /// `ceil(holders/1000) + 2 * (holders * (1 - cacheHitRate))` (spec §4.5.2).
    pub fn estimate_cost(holders: u64, cache_hit_rate: f64) -> u64 {
        let base = holders.div_ceil(1000);
        let miss_cost = 2.0 * (holders as f64) * (1.0 - cache_hit_rate.clamp(0.0, 1.0));
        base + miss_cost.ceil() as u64
    }

    /// Rejects if charging `cost` would cross the hard stop; otherwise
    /// charges it and returns the new total.
    pub fn try_charge(&self, cost: u64) -> Result<u64, u64> {
        let hard_stop = self.config.hard_stop_credits();
        loop {
            let current = self.used.load(Ordering::Relaxed);
            let next = current + cost;
            if next > hard_stop {
                return Err(current);
            }
            if self
                .used
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return Ok(next);
            }
        }
    }

    pub fn is_above_target(&self) -> bool {
        self.used() >= self.config.target_credits()
    }

    pub fn is_at_hard_stop(&self) -> bool {
        self.used() >= self.config.hard_stop_credits()
    }

    /// `true` exactly once per crossing of the hard stop: the first caller
    /// to observe `used >= hard_stop` after it was below wins the flip and
    /// should emit the `creditWarning` event; every other caller (same
    /// month, still over the line) gets `false`.
    pub fn check_hard_stop_crossing(&self) -> bool {
        self.is_at_hard_stop() && self.hard_stop_warned.compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_estimate_matches_formula() {
        assert_eq!(CreditTracker::estimate_cost(1000, 1.0), 1);
        assert_eq!(CreditTracker::estimate_cost(1000, 0.0), 1 + 2000);
    }

    #[test]
    fn charge_rejected_past_hard_stop() {
        let tracker = CreditTracker::new(HolderBudgetConfig { monthly_cap: 100, target_pct: 50.0, hard_stop_pct: 85.0 });
        assert!(tracker.try_charge(80).is_ok());
        assert!(tracker.try_charge(10).is_err());
    }

    #[test]
    fn target_and_hard_stop_thresholds() {
        let tracker = CreditTracker::new(HolderBudgetConfig { monthly_cap: 100, target_pct: 50.0, hard_stop_pct: 85.0 });
        assert!(!tracker.is_above_target());
        tracker.try_charge(60).unwrap();
        assert!(tracker.is_above_target());
        assert!(!tracker.is_at_hard_stop());
    }

    #[test]
    fn hard_stop_crossing_fires_exactly_once() {
        let tracker = CreditTracker::new(HolderBudgetConfig { monthly_cap: 100, target_pct: 50.0, hard_stop_pct: 85.0 });
        assert!(!tracker.check_hard_stop_crossing());
        tracker.try_charge(85).unwrap();
        assert!(tracker.check_hard_stop_crossing());
        assert!(!tracker.check_hard_stop_crossing());
    }
}
