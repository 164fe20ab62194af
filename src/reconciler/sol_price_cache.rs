//! SOL/USD reference price cache (spec §4.4): 5s TTL, falls back to 165 on
//! cold miss and logs. Populates `priceUsd` at trade-emit time.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::logger::{self, LogTag};
use crate::store::Store;

pub struct SolUsdCache {
    ttl: Duration,
    fallback: f64,
    cached: Mutex<Option<(f64, Instant)>>,
}

impl SolUsdCache {
    pub fn new(ttl: Duration, fallback: f64) -> Self {
        Self { ttl, fallback, cached: Mutex::new(None) }
    }

    pub async fn get(&self, store: &Store) -> f64 {
        let mut cached = self.cached.lock().await;
        if let Some((price, at)) = *cached {
            if at.elapsed() < self.ttl {
                return price;
            }
        }

        let price = match store.get_sol_usd_latest() {
            Ok(Some(row)) => row.price_usd,
            Ok(None) => {
                logger::warning(LogTag::Reconciler, "sol/usd cache cold miss, using fallback");
                self.fallback
            }
            Err(e) => {
                logger::warning(LogTag::Reconciler, &format!("sol/usd lookup failed: {e}, using fallback"));
                self.fallback
            }
        };
        *cached = Some((price, Instant::now()));
        price
    }
}
