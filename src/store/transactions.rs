use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::errors::CoreError;
use crate::store::connection::Store;
use crate::store::models::{Candle, Transaction, TradeType};

/// Chunk size for batched appends (spec §4.1: "parameter-limited chunks,
/// max ≈1000 per statement"). Each transaction row binds 16 params, well
/// under sqlite's default `SQLITE_MAX_VARIABLE_NUMBER`.
const MAX_BATCH_CHUNK: usize = 1000;

impl Store {
    /// Insert if `(signature, block_time)` is new; silent no-op otherwise.
    pub fn append_transaction(&self, tx: &Transaction) -> Result<bool, CoreError> {
        let conn = self.conn.lock().unwrap();
        let inserted = insert_transaction(&conn, tx)?;
        Ok(inserted)
    }

    /// Each chunk is one statement, atomic per-chunk (not across chunks), so
    /// a crash mid-batch leaves only fully-committed chunks behind.
    pub fn append_transaction_batch(&self, txs: &[Transaction]) -> Result<usize, CoreError> {
        let mut total_inserted = 0usize;
        for chunk in txs.chunks(MAX_BATCH_CHUNK) {
            let conn = self.conn.lock().unwrap();
            let tx = conn.unchecked_transaction().map_err(CoreError::from)?;
            for record in chunk {
                if insert_transaction(&tx, record)? {
                    total_inserted += 1;
                }
            }
            tx.commit().map_err(CoreError::from)?;
        }
        Ok(total_inserted)
    }

    /// Every transaction for `token_id` at or after `from`, oldest first —
    /// the window `score::technical::compute` needs for trading-health and
    /// selloff-response.
    pub fn get_transactions_since(&self, token_id: i64, from: DateTime<Utc>) -> Result<Vec<Transaction>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT signature, block_time, pool_id, token_id, slot, kind, user, sol_amount,
                        token_amount, price_per_token, pre_base_reserves, pre_quote_reserves,
                        post_base_reserves, post_quote_reserves, fees, raw_metadata
                 FROM transactions
                 WHERE token_id = ?1 AND block_time >= ?2
                 ORDER BY block_time ASC",
            )
            .map_err(CoreError::from)?;
        let rows = stmt
            .query_map(params![token_id, from.to_rfc3339()], row_to_transaction)
            .map_err(CoreError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::from)
    }

    /// Aggregates Transactions with `pricePerToken > 0` into 1-minute
    /// candles for `[from, to)`, matching the derived-view contract in
    /// spec §4.1 exactly (computed on read rather than materialized,
    /// since the continuous-aggregate refresh policy is external to the
    /// core per spec §4.1).
    pub fn query_candles(
        &self,
        token_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT
                    strftime('%Y-%m-%dT%H:%M:00Z', block_time) AS minute,
                    SUM(sol_amount) AS volume_sol,
                    SUM(token_amount) AS volume_token,
                    COUNT(*) AS trade_count,
                    COUNT(DISTINCT CASE WHEN kind = 'buy' THEN user END) AS buyer_count,
                    COUNT(DISTINCT CASE WHEN kind = 'sell' THEN user END) AS seller_count
                 FROM transactions
                 WHERE token_id = ?1 AND price_per_token > 0 AND block_time >= ?2 AND block_time < ?3
                 GROUP BY minute
                 ORDER BY minute ASC",
            )
            .map_err(CoreError::from)?;

        let minutes: Vec<(String, i64, i64, i64, i64, i64)> = stmt
            .query_map(params![token_id, from.to_rfc3339(), to.to_rfc3339()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .map_err(CoreError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(CoreError::from)?;

        let mut candles = Vec::with_capacity(minutes.len());
        for (minute_str, volume_sol, volume_token, trade_count, buyer_count, seller_count) in minutes {
            let minute_start = DateTime::parse_from_rfc3339(&minute_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            let minute_end = minute_start + chrono::Duration::minutes(1);

            let (open, high, low, close): (f64, f64, f64, f64) = conn
                .query_row(
                    "SELECT
                        (SELECT price_per_token FROM transactions
                         WHERE token_id = ?1 AND price_per_token > 0 AND block_time >= ?2 AND block_time < ?3
                         ORDER BY block_time ASC LIMIT 1),
                        MAX(price_per_token),
                        MIN(price_per_token),
                        (SELECT price_per_token FROM transactions
                         WHERE token_id = ?1 AND price_per_token > 0 AND block_time >= ?2 AND block_time < ?3
                         ORDER BY block_time DESC LIMIT 1)
                     FROM transactions
                     WHERE token_id = ?1 AND price_per_token > 0 AND block_time >= ?2 AND block_time < ?3",
                    params![token_id, minute_start.to_rfc3339(), minute_end.to_rfc3339()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .map_err(CoreError::from)?;

            candles.push(Candle {
                token_id,
                minute: minute_start,
                open,
                high,
                low,
                close,
                volume_sol: volume_sol as u64,
                volume_token: volume_token as u64,
                trade_count: trade_count as u64,
                buyer_count: buyer_count as u64,
                seller_count: seller_count as u64,
            });
        }
        Ok(candles)
    }
}

fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let block_time: String = row.get(1)?;
    let kind: String = row.get(5)?;
    Ok(Transaction {
        signature: row.get(0)?,
        block_time: DateTime::parse_from_rfc3339(&block_time)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        pool_id: row.get(2)?,
        token_id: row.get(3)?,
        slot: row.get::<_, i64>(4)? as u64,
        kind: if kind == "buy" { TradeType::Buy } else { TradeType::Sell },
        user: row.get(6)?,
        sol_amount: row.get::<_, i64>(7)? as u64,
        token_amount: row.get::<_, i64>(8)? as u64,
        price_per_token: row.get(9)?,
        pre_base_reserves: row.get::<_, i64>(10)? as u64,
        pre_quote_reserves: row.get::<_, i64>(11)? as u64,
        post_base_reserves: row.get::<_, i64>(12)? as u64,
        post_quote_reserves: row.get::<_, i64>(13)? as u64,
        fees: row.get::<_, i64>(14)? as u64,
        raw_metadata: row.get(15)?,
    })
}

fn insert_transaction(conn: &rusqlite::Connection, tx: &Transaction) -> Result<bool, CoreError> {
    let changed = conn
        .execute(
            "INSERT INTO transactions (signature, block_time, pool_id, token_id, slot, kind, user,
                sol_amount, token_amount, price_per_token, pre_base_reserves, pre_quote_reserves,
                post_base_reserves, post_quote_reserves, fees, raw_metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT (signature, block_time) DO NOTHING",
            params![
                tx.signature,
                tx.block_time.to_rfc3339(),
                tx.pool_id,
                tx.token_id,
                tx.slot as i64,
                tx.kind.as_str(),
                tx.user,
                tx.sol_amount as i64,
                tx.token_amount as i64,
                tx.price_per_token,
                tx.pre_base_reserves as i64,
                tx.pre_quote_reserves as i64,
                tx.post_base_reserves as i64,
                tx.post_quote_reserves as i64,
                tx.fees as i64,
                tx.raw_metadata,
            ],
        )
        .map_err(CoreError::from)?;
    Ok(changed > 0)
}
