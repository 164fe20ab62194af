use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::errors::CoreError;
use crate::store::connection::Store;
use crate::store::models::{Pool, PoolReservesUpdate, PoolStatus, Venue};
use crate::store::tokens::is_unique_violation;

impl Store {
    /// Same upsert shape as `upsert_token`: idempotent on `pool_address`,
    /// hard error on a venue mismatch against the pool's token (spec §4.1).
    pub fn upsert_pool(
        &self,
        pool_address: &str,
        token_id: i64,
        base_mint: &str,
        quote_mint: &str,
        venue: Venue,
    ) -> Result<i64, CoreError> {
        let conn = self.conn.lock().unwrap();

        let token_venue: String = conn
            .query_row("SELECT venue FROM tokens WHERE id = ?1", params![token_id], |row| row.get(0))
            .map_err(CoreError::from)?;
        if token_venue != venue.as_str() {
            return Err(CoreError::InvariantViolation(format!(
                "pool {pool_address} venue {} does not match token venue {token_venue}",
                venue.as_str()
            )));
        }

        if let Some(id) = conn
            .query_row(
                "SELECT id FROM pools WHERE pool_address = ?1",
                params![pool_address],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(CoreError::from)?
        {
            return Ok(id);
        }

        let result = conn.execute(
            "INSERT INTO pools (pool_address, token_id, base_mint, quote_mint, venue, status, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)",
            params![pool_address, token_id, base_mint, quote_mint, venue.as_str(), Utc::now().to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => conn
                .query_row(
                    "SELECT id FROM pools WHERE pool_address = ?1",
                    params![pool_address],
                    |row| row.get(0),
                )
                .map_err(CoreError::from),
            Err(e) => Err(CoreError::from(e)),
        }
    }

    /// Partial update of present fields only; bumps `updated_at` (spec §4.1).
    /// `status=graduated` is terminal — never overwritten once set.
    pub fn update_pool_reserves(
        &self,
        pool_address: &str,
        update: &PoolReservesUpdate,
    ) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        let current_status: String = conn
            .query_row("SELECT status FROM pools WHERE pool_address = ?1", params![pool_address], |row| {
                row.get(0)
            })
            .map_err(CoreError::from)?;

        let mut sets: Vec<String> = vec!["updated_at = ?".to_string()];
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(Utc::now().to_rfc3339())];

        macro_rules! maybe_set {
            ($field:expr, $column:literal) => {
                if let Some(v) = $field {
                    sets.push(format!("{} = ?", $column));
                    values.push(Box::new(v));
                }
            };
        }

        maybe_set!(update.virtual_base_reserves.map(|v| v as i64), "virtual_base_reserves");
        maybe_set!(update.virtual_quote_reserves.map(|v| v as i64), "virtual_quote_reserves");
        maybe_set!(update.real_base_reserves.map(|v| v as i64), "real_base_reserves");
        maybe_set!(update.real_quote_reserves.map(|v| v as i64), "real_quote_reserves");
        maybe_set!(update.latest_price, "latest_price");
        maybe_set!(update.latest_price_usd, "latest_price_usd");
        maybe_set!(update.bonding_curve_progress.map(|p| p.clamp(0.0, 100.0)), "bonding_curve_progress");

        if current_status != PoolStatus::Graduated.as_str() {
            if let Some(status) = update.status {
                sets.push("status = ?".to_string());
                values.push(Box::new(status.as_str().to_string()));
            }
        }

        let sql = format!("UPDATE pools SET {} WHERE pool_address = ?", sets.join(", "));
        values.push(Box::new(pool_address.to_string()));

        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, param_refs.as_slice()).map_err(CoreError::from)?;
        Ok(())
    }

    pub fn mark_pool_graduated(&self, pool_id: i64) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE pools SET status = 'graduated', updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), pool_id],
        )
        .map_err(CoreError::from)?;
        Ok(())
    }

    pub fn get_pool_by_address(&self, pool_address: &str) -> Result<Option<Pool>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, pool_address, token_id, base_mint, quote_mint, venue, status,
                    virtual_base_reserves, virtual_quote_reserves, real_base_reserves, real_quote_reserves,
                    bonding_curve_progress, latest_price, latest_price_usd, updated_at
             FROM pools WHERE pool_address = ?1",
            params![pool_address],
            row_to_pool,
        )
        .optional()
        .map_err(CoreError::from)
    }

    /// Fallback lookup used by the reconciler's id-resolution cache when a
    /// record carries a mint but no pool address: oldest pool for the token.
    pub fn get_oldest_pool_for_token(&self, token_id: i64) -> Result<Option<Pool>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, pool_address, token_id, base_mint, quote_mint, venue, status,
                    virtual_base_reserves, virtual_quote_reserves, real_base_reserves, real_quote_reserves,
                    bonding_curve_progress, latest_price, latest_price_usd, updated_at
             FROM pools WHERE token_id = ?1 ORDER BY id ASC LIMIT 1",
            params![token_id],
            row_to_pool,
        )
        .optional()
        .map_err(CoreError::from)
    }

    pub fn get_pool(&self, pool_id: i64) -> Result<Option<Pool>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, pool_address, token_id, base_mint, quote_mint, venue, status,
                    virtual_base_reserves, virtual_quote_reserves, real_base_reserves, real_quote_reserves,
                    bonding_curve_progress, latest_price, latest_price_usd, updated_at
             FROM pools WHERE id = ?1",
            params![pool_id],
            row_to_pool,
        )
        .optional()
        .map_err(CoreError::from)
    }

    /// Pools created for a graduated token's target AMM within the match
    /// window, used by graduation linking (spec §4.4).
    pub fn get_pools_for_token_since(
        &self,
        token_id: i64,
        since: chrono::DateTime<Utc>,
    ) -> Result<Vec<Pool>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, pool_address, token_id, base_mint, quote_mint, venue, status,
                        virtual_base_reserves, virtual_quote_reserves, real_base_reserves, real_quote_reserves,
                        bonding_curve_progress, latest_price, latest_price_usd, updated_at
                 FROM pools WHERE token_id = ?1 AND updated_at >= ?2",
            )
            .map_err(CoreError::from)?;
        let rows = stmt
            .query_map(params![token_id, since.to_rfc3339()], row_to_pool)
            .map_err(CoreError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::from)
    }
}

fn row_to_pool(row: &rusqlite::Row) -> rusqlite::Result<Pool> {
    let venue_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let updated_at: String = row.get(14)?;
    Ok(Pool {
        id: row.get(0)?,
        pool_address: row.get(1)?,
        token_id: row.get(2)?,
        base_mint: row.get(3)?,
        quote_mint: row.get(4)?,
        venue: Venue::from_str(&venue_str).unwrap_or(Venue::PumpFun),
        status: PoolStatus::from_str(&status_str),
        virtual_base_reserves: row.get::<_, i64>(7)? as u64,
        virtual_quote_reserves: row.get::<_, i64>(8)? as u64,
        real_base_reserves: row.get::<_, i64>(9)? as u64,
        real_quote_reserves: row.get::<_, i64>(10)? as u64,
        bonding_curve_progress: row.get(11)?,
        latest_price: row.get(12)?,
        latest_price_usd: row.get(13)?,
        updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
