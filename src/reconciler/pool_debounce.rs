//! Pool-state write debounce (spec §4.4): `PoolStateUpdate` collapses to at
//! most one write per pool per `FLUSH_INTERVAL`, latest-wins.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::store::PoolReservesUpdate;

struct Pending {
    update: PoolReservesUpdate,
    queued_at: Instant,
}

pub struct PoolDebouncer {
    interval: Duration,
    pending: Mutex<HashMap<String, Pending>>,
}

impl PoolDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, pending: Mutex::new(HashMap::new()) }
    }

    /// Merges `update` into whatever is already queued for `pool_address`;
    /// fields present in the new update win (latest-wins per field).
    pub async fn stage(&self, pool_address: &str, update: PoolReservesUpdate) {
        let mut pending = self.pending.lock().await;
        let entry = pending.entry(pool_address.to_string()).or_insert_with(|| Pending {
            update: PoolReservesUpdate::default(),
            queued_at: Instant::now(),
        });
        merge(&mut entry.update, update);
    }

    /// Drains every pool whose debounce interval has elapsed since it was
    /// first staged; called from a periodic flush tick.
    pub async fn drain_due(&self) -> Vec<(String, PoolReservesUpdate)> {
        let mut pending = self.pending.lock().await;
        let due: Vec<String> = pending
            .iter()
            .filter(|(_, p)| p.queued_at.elapsed() >= self.interval)
            .map(|(addr, _)| addr.clone())
            .collect();
        due.into_iter()
            .filter_map(|addr| pending.remove(&addr).map(|p| (addr, p.update)))
            .collect()
    }

    /// Unconditional drain, used by the shutdown sequence's batch-flush phase.
    pub async fn drain_all(&self) -> Vec<(String, PoolReservesUpdate)> {
        self.pending.lock().await.drain().map(|(addr, p)| (addr, p.update)).collect()
    }
}

fn merge(into: &mut PoolReservesUpdate, from: PoolReservesUpdate) {
    if from.virtual_base_reserves.is_some() {
        into.virtual_base_reserves = from.virtual_base_reserves;
    }
    if from.virtual_quote_reserves.is_some() {
        into.virtual_quote_reserves = from.virtual_quote_reserves;
    }
    if from.real_base_reserves.is_some() {
        into.real_base_reserves = from.real_base_reserves;
    }
    if from.real_quote_reserves.is_some() {
        into.real_quote_reserves = from.real_quote_reserves;
    }
    if from.latest_price.is_some() {
        into.latest_price = from.latest_price;
    }
    if from.latest_price_usd.is_some() {
        into.latest_price_usd = from.latest_price_usd;
    }
    if from.bonding_curve_progress.is_some() {
        into.bonding_curve_progress = from.bonding_curve_progress;
    }
    if from.status.is_some() {
        into.status = from.status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn later_field_wins_over_earlier() {
        let debouncer = PoolDebouncer::new(Duration::from_millis(1));
        debouncer
            .stage("P1", PoolReservesUpdate { latest_price: Some(1.0), ..Default::default() })
            .await;
        debouncer
            .stage("P1", PoolReservesUpdate { latest_price: Some(2.0), ..Default::default() })
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let due = debouncer.drain_due().await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1.latest_price, Some(2.0));
    }
}
