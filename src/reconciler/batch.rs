//! Per-consumer trade batching (spec §4.4): buffered to size `B` with flush
//! timeout `T`, oldest-first flush. One batcher instance per consumer queue
//! so ordering within a consumer's stream is preserved.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::store::Transaction;

pub struct TradeBatcher {
    max_size: usize,
    timeout: Duration,
    buffer: Mutex<(Vec<Transaction>, Instant)>,
}

impl TradeBatcher {
    pub fn new(max_size: usize, timeout: Duration) -> Self {
        Self { max_size, timeout, buffer: Mutex::new((Vec::new(), Instant::now())) }
    }

    /// Adds `tx` to the buffer; returns `Some(batch)` if the batch is now
    /// due for flush (full, or past the timeout since the first buffered row).
    pub async fn push(&self, tx: Transaction) -> Option<Vec<Transaction>> {
        let mut guard = self.buffer.lock().await;
        let (buf, since) = &mut *guard;
        if buf.is_empty() {
            *since = Instant::now();
        }
        buf.push(tx);

        if buf.len() >= self.max_size {
            return Some(std::mem::take(buf));
        }
        None
    }

    /// Called on a timer tick; flushes if the oldest buffered row has been
    /// waiting past `timeout`, even if the batch isn't full.
    pub async fn flush_if_due(&self) -> Option<Vec<Transaction>> {
        let mut guard = self.buffer.lock().await;
        let (buf, since) = &mut *guard;
        if !buf.is_empty() && since.elapsed() >= self.timeout {
            return Some(std::mem::take(buf));
        }
        None
    }

    /// Unconditional flush, used by the shutdown sequence's batch-flush phase.
    pub async fn drain(&self) -> Vec<Transaction> {
        let mut guard = self.buffer.lock().await;
        std::mem::take(&mut guard.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TradeType;
    use chrono::Utc;

    fn sample_tx(sig: &str) -> Transaction {
        Transaction {
            signature: sig.to_string(),
            block_time: Utc::now(),
            pool_id: 1,
            token_id: 1,
            slot: 0,
            kind: TradeType::Buy,
            user: "w".to_string(),
            sol_amount: 1,
            token_amount: 1,
            price_per_token: Some(1.0),
            pre_base_reserves: 0,
            pre_quote_reserves: 0,
            post_base_reserves: 0,
            post_quote_reserves: 0,
            fees: 0,
            raw_metadata: None,
        }
    }

    #[tokio::test]
    async fn flushes_when_full() {
        let batcher = TradeBatcher::new(2, Duration::from_secs(5));
        assert!(batcher.push(sample_tx("A")).await.is_none());
        let flushed = batcher.push(sample_tx("B")).await.unwrap();
        assert_eq!(flushed.len(), 2);
    }

    #[tokio::test]
    async fn flushes_on_timeout() {
        let batcher = TradeBatcher::new(50, Duration::from_millis(1));
        batcher.push(sample_tx("A")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let flushed = batcher.flush_if_due().await.unwrap();
        assert_eq!(flushed.len(), 1);
    }
}
