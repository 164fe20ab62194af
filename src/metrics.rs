//! Operational counters referenced throughout spec §7/§8: duplicate-key
//! races, decode skips, unresolved ids, and holder-budget usage. Grounded on
//! the teacher's RPC stats collector shape (plain atomics behind a shared
//! struct, snapshotted for periodic logging) rather than a metrics crate,
//! since nothing downstream of this process scrapes Prometheus today.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub duplicate_key: AtomicU64,
    pub decode_skip: AtomicU64,
    pub unresolved_id: AtomicU64,
    pub invalid_decode: AtomicU64,
    pub invariant_violation: AtomicU64,
    pub holder_credits_used: AtomicU64,
    pub holder_budget_warnings: AtomicU64,
    pub transactions_appended: AtomicU64,
    pub pool_state_updates: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountersSnapshot {
    pub duplicate_key: u64,
    pub decode_skip: u64,
    pub unresolved_id: u64,
    pub invalid_decode: u64,
    pub invariant_violation: u64,
    pub holder_credits_used: u64,
    pub holder_budget_warnings: u64,
    pub transactions_appended: u64,
    pub pool_state_updates: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_duplicate_key(&self) {
        self.duplicate_key.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_decode_skip(&self) {
        self.decode_skip.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_unresolved_id(&self) {
        self.unresolved_id.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_invalid_decode(&self) {
        self.invalid_decode.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_invariant_violation(&self) {
        self.invariant_violation.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_holder_credits(&self, credits: u64) -> u64 {
        self.holder_credits_used.fetch_add(credits, Ordering::Relaxed) + credits
    }

    pub fn incr_holder_budget_warning(&self) {
        self.holder_budget_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_transactions_appended(&self, n: u64) {
        self.transactions_appended.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_pool_state_update(&self) {
        self.pool_state_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            duplicate_key: self.duplicate_key.load(Ordering::Relaxed),
            decode_skip: self.decode_skip.load(Ordering::Relaxed),
            unresolved_id: self.unresolved_id.load(Ordering::Relaxed),
            invalid_decode: self.invalid_decode.load(Ordering::Relaxed),
            invariant_violation: self.invariant_violation.load(Ordering::Relaxed),
            holder_credits_used: self.holder_credits_used.load(Ordering::Relaxed),
            holder_budget_warnings: self.holder_budget_warnings.load(Ordering::Relaxed),
            transactions_appended: self.transactions_appended.load(Ordering::Relaxed),
            pool_state_updates: self.pool_state_updates.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let counters = Counters::new();
        counters.incr_duplicate_key();
        counters.incr_duplicate_key();
        counters.incr_decode_skip();
        let snap = counters.snapshot();
        assert_eq!(snap.duplicate_key, 2);
        assert_eq!(snap.decode_skip, 1);
        assert_eq!(snap.unresolved_id, 0);
    }
}
