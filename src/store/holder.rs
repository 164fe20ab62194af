use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::errors::CoreError;
use crate::store::connection::Store;
use crate::store::models::HolderScore;

impl Store {
    /// Append-only; latest row per token is the current score (spec §3).
    pub fn insert_holder_score(&self, score: &HolderScore) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO holder_scores (token_id, score_time, distribution_score, quality_score,
                activity_score, total_score, gini, top1_pct_concentration, holder_count, bot_ratio,
                smart_money_ratio, credits_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                score.token_id,
                score.score_time.to_rfc3339(),
                score.distribution_score,
                score.quality_score,
                score.activity_score,
                score.total_score,
                score.gini,
                score.top1_pct_concentration,
                score.holder_count as i64,
                score.bot_ratio,
                score.smart_money_ratio,
                score.credits_used as i64,
            ],
        )
        .map_err(CoreError::from)?;
        Ok(())
    }

    pub fn get_latest_holder_score(&self, token_id: i64) -> Result<Option<HolderScore>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT token_id, score_time, distribution_score, quality_score, activity_score,
                    total_score, gini, top1_pct_concentration, holder_count, bot_ratio,
                    smart_money_ratio, credits_used
             FROM holder_scores WHERE token_id = ?1 ORDER BY score_time DESC LIMIT 1",
            params![token_id],
            row_to_holder_score,
        )
        .optional()
        .map_err(CoreError::from)
    }

    /// Candidate tokens for the eligibility filter in spec §4.5.2: active
    /// pools with progress in `[10,100)`, old enough, with enough trades.
    pub fn get_holder_eligible_tokens(
        &self,
        min_age: DateTime<Utc>,
        min_tx_count: u64,
    ) -> Result<Vec<(i64, f64)>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT t.id, p.bonding_curve_progress
                 FROM tokens t
                 JOIN pools p ON p.token_id = t.id
                 WHERE p.status = 'active'
                   AND p.bonding_curve_progress >= 10.0 AND p.bonding_curve_progress < 100.0
                   AND t.creation_time <= ?1
                   AND (SELECT COUNT(*) FROM transactions tx WHERE tx.token_id = t.id) >= ?2",
            )
            .map_err(CoreError::from)?;
        let rows = stmt
            .query_map(params![min_age.to_rfc3339(), min_tx_count as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(CoreError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::from)
    }
}

fn row_to_holder_score(row: &rusqlite::Row) -> rusqlite::Result<HolderScore> {
    let score_time: String = row.get(1)?;
    Ok(HolderScore {
        token_id: row.get(0)?,
        score_time: DateTime::parse_from_rfc3339(&score_time)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        distribution_score: row.get(2)?,
        quality_score: row.get(3)?,
        activity_score: row.get(4)?,
        total_score: row.get(5)?,
        gini: row.get(6)?,
        top1_pct_concentration: row.get(7)?,
        holder_count: row.get::<_, i64>(8)? as u64,
        bot_ratio: row.get(9)?,
        smart_money_ratio: row.get(10)?,
        credits_used: row.get::<_, i64>(11)? as u64,
    })
}
