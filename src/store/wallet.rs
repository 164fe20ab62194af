use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::errors::CoreError;
use crate::store::connection::Store;
use crate::store::models::WalletAnalysis;

impl Store {
    /// Upserted; `last_analyzed` is monotonic (spec §3) so a stale
    /// re-enrichment never clobbers a fresher analysis.
    pub fn upsert_wallet_analysis(&self, analysis: &WalletAnalysis) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO wallet_analyses (wallet_address, created_at, last_active, tx_count,
                sol_balance, wallet_age_days, is_bot, is_smart_money, risk_score, last_analyzed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (wallet_address) DO UPDATE SET
                last_active = excluded.last_active,
                tx_count = excluded.tx_count,
                sol_balance = excluded.sol_balance,
                wallet_age_days = excluded.wallet_age_days,
                is_bot = excluded.is_bot,
                is_smart_money = excluded.is_smart_money,
                risk_score = excluded.risk_score,
                last_analyzed = excluded.last_analyzed
             WHERE excluded.last_analyzed >= wallet_analyses.last_analyzed",
            params![
                analysis.wallet_address,
                analysis.created_at.to_rfc3339(),
                analysis.last_active.to_rfc3339(),
                analysis.tx_count as i64,
                analysis.sol_balance as i64,
                analysis.wallet_age_days,
                analysis.is_bot,
                analysis.is_smart_money,
                analysis.risk_score,
                analysis.last_analyzed.to_rfc3339(),
            ],
        )
        .map_err(CoreError::from)?;
        Ok(())
    }

    pub fn get_wallet_analysis(&self, wallet_address: &str) -> Result<Option<WalletAnalysis>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT wallet_address, created_at, last_active, tx_count, sol_balance, wallet_age_days,
                    is_bot, is_smart_money, risk_score, last_analyzed
             FROM wallet_analyses WHERE wallet_address = ?1",
            params![wallet_address],
            row_to_wallet_analysis,
        )
        .optional()
        .map_err(CoreError::from)
    }
}

fn row_to_wallet_analysis(row: &rusqlite::Row) -> rusqlite::Result<WalletAnalysis> {
    let created_at: String = row.get(1)?;
    let last_active: String = row.get(2)?;
    let last_analyzed: String = row.get(9)?;
    let parse = |s: &str| {
        DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
    };
    Ok(WalletAnalysis {
        wallet_address: row.get(0)?,
        created_at: parse(&created_at),
        last_active: parse(&last_active),
        tx_count: row.get::<_, i64>(3)? as u64,
        sol_balance: row.get::<_, i64>(4)? as u64,
        wallet_age_days: row.get(5)?,
        is_bot: row.get(6)?,
        is_smart_money: row.get(7)?,
        risk_score: row.get(8)?,
        last_analyzed: parse(&last_analyzed),
    })
}
