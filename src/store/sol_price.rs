use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::errors::CoreError;
use crate::store::connection::Store;
use crate::store::models::SolUsdPrice;

impl Store {
    /// Reference SOL/USD time is strictly increasing; out-of-order writes
    /// from a stale source are silently ignored rather than overwriting a
    /// newer price.
    pub fn insert_sol_usd_price(&self, price_time: DateTime<Utc>, price_usd: f64) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO sol_usd_prices (price_time, price_usd) VALUES (?1, ?2)",
            params![price_time.to_rfc3339(), price_usd],
        )
        .map_err(CoreError::from)?;
        Ok(())
    }

    pub fn get_sol_usd_latest(&self) -> Result<Option<SolUsdPrice>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT price_time, price_usd FROM sol_usd_prices ORDER BY price_time DESC LIMIT 1",
            [],
            |row| {
                let price_time: String = row.get(0)?;
                Ok(SolUsdPrice {
                    price_time: DateTime::parse_from_rfc3339(&price_time)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    price_usd: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(CoreError::from)
    }
}
