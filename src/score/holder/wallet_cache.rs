//! Tiered wallet enrichment cache (spec §4.5.2): hot (5 min) / warm (30
//! min) / cold (2 h) / permanent (24 h for known bots/smart money). Hits
//! promote to a longer tier on access; `evict_expired` drops anything past
//! its tier's TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::rpc::enrich::WalletHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hot,
    Warm,
    Cold,
    Permanent,
}

impl Tier {
    fn ttl(self) -> Duration {
        match self {
            Tier::Hot => Duration::from_secs(5 * 60),
            Tier::Warm => Duration::from_secs(30 * 60),
            Tier::Cold => Duration::from_secs(2 * 60 * 60),
            Tier::Permanent => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// One step toward `Permanent`; already-`Permanent` entries stay put.
    fn promoted(self) -> Tier {
        match self {
            Tier::Hot => Tier::Warm,
            Tier::Warm => Tier::Cold,
            Tier::Cold | Tier::Permanent => Tier::Permanent,
        }
    }
}

struct Entry {
    history: WalletHistory,
    tier: Tier,
    inserted_at: Instant,
}

pub struct WalletCache {
    entries: HashMap<String, Entry>,
}

impl WalletCache {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Returns the cached history and promotes its tier, or `None` on a
    /// cold miss (caller then loads from the Store, then from enrichment).
    pub fn get(&mut self, wallet: &str) -> Option<WalletHistory> {
        let entry = self.entries.get_mut(wallet)?;
        if entry.inserted_at.elapsed() >= entry.tier.ttl() {
            self.entries.remove(wallet);
            return None;
        }
        let history = entry.history.clone();
        entry.tier = entry.tier.promoted();
        entry.inserted_at = Instant::now();
        Some(history)
    }

    /// Known bots and smart-money wallets start in `Permanent`; everything
    /// else starts `Hot` (spec §4.5.2).
    pub fn put(&mut self, history: WalletHistory) {
        let tier = if history.is_known_bot || history.is_smart_money { Tier::Permanent } else { Tier::Hot };
        self.entries.insert(history.wallet.clone(), Entry { history, tier, inserted_at: Instant::now() });
    }

    pub fn evict_expired(&mut self) {
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < entry.tier.ttl());
    }

    pub fn hit_rate(&self, queried: usize, hits: usize) -> f64 {
        if queried == 0 {
            1.0
        } else {
            hits as f64 / queried as f64
        }
    }
}

impl Default for WalletCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(wallet: &str, is_bot: bool) -> WalletHistory {
        WalletHistory {
            wallet: wallet.to_string(),
            first_seen_unix: 0,
            is_known_bot: is_bot,
            is_smart_money: false,
            trade_count_30d: 0,
        }
    }

    #[test]
    fn bots_start_permanent() {
        let mut cache = WalletCache::new();
        cache.put(sample("BOT1", true));
        assert_eq!(cache.entries.get("BOT1").unwrap().tier, Tier::Permanent);
    }

    #[test]
    fn normal_wallet_starts_hot_and_promotes_on_hit() {
        let mut cache = WalletCache::new();
        cache.put(sample("W1", false));
        assert_eq!(cache.entries.get("W1").unwrap().tier, Tier::Hot);
        cache.get("W1");
        assert_eq!(cache.entries.get("W1").unwrap().tier, Tier::Warm);
    }

    #[test]
    fn miss_on_unknown_wallet() {
        let mut cache = WalletCache::new();
        assert!(cache.get("GHOST").is_none());
    }
}
