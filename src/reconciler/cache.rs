//! Tiered id-resolution cache (spec §4.4): `(mintAddress) -> (tokenId,
//! poolId)` with a 5-minute TTL, so the hot path for a trade doesn't hit the
//! store for every update.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub struct ResolvedIds {
    pub token_id: i64,
    pub pool_id: i64,
}

struct Entry {
    ids: ResolvedIds,
    inserted_at: Instant,
}

pub struct IdCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl IdCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub async fn get(&self, mint_address: &str) -> Option<ResolvedIds> {
        let entries = self.entries.lock().await;
        entries.get(mint_address).and_then(|entry| {
            (entry.inserted_at.elapsed() < self.ttl).then_some(entry.ids)
        })
    }

    pub async fn put(&self, mint_address: &str, ids: ResolvedIds) {
        self.entries
            .lock()
            .await
            .insert(mint_address.to_string(), Entry { ids, inserted_at: Instant::now() });
    }

    /// Drops expired entries; call periodically from a housekeeping tick.
    pub async fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.lock().await.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = IdCache::new(Duration::from_millis(1));
        cache.put("M1", ResolvedIds { token_id: 1, pool_id: 2 }).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("M1").await.is_none());
    }

    #[tokio::test]
    async fn fresh_entries_round_trip() {
        let cache = IdCache::new(Duration::from_secs(300));
        cache.put("M1", ResolvedIds { token_id: 1, pool_id: 2 }).await;
        let ids = cache.get("M1").await.unwrap();
        assert_eq!(ids.token_id, 1);
        assert_eq!(ids.pool_id, 2);
    }
}
