use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::errors::CoreError;
use crate::logger::{self, LogTag};
use crate::store::connection::Store;
use crate::store::models::{Token, TokenUpdate, Venue};

impl Store {
    /// Insert a new token row, or update mutable fields on an existing one
    /// keyed by `mint_address`. Venue and decimals are immutable once set
    /// (spec §3); a caller attempting to change venue gets `InvariantViolation`.
    pub fn upsert_token(
        &self,
        mint_address: &str,
        symbol: &str,
        name: &str,
        decimals: u8,
        venue: Venue,
        creation_sig: &str,
        creation_time: DateTime<Utc>,
        creator: &str,
    ) -> Result<i64, CoreError> {
        let conn = self.conn.lock().unwrap();

        if let Some(existing) = conn
            .query_row(
                "SELECT id, venue FROM tokens WHERE mint_address = ?1",
                params![mint_address],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(CoreError::from)?
        {
            let (id, existing_venue) = existing;
            if existing_venue != venue.as_str() {
                return Err(CoreError::InvariantViolation(format!(
                    "token {mint_address} venue change rejected: {existing_venue} -> {}",
                    venue.as_str()
                )));
            }
            conn.execute(
                "UPDATE tokens SET symbol = ?1, name = ?2 WHERE id = ?3",
                params![symbol, name, id],
            )
            .map_err(CoreError::from)?;
            return Ok(id);
        }

        let result = conn.execute(
            "INSERT INTO tokens (mint_address, symbol, name, decimals, venue, creation_sig, creation_time, creator)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                mint_address,
                symbol,
                name,
                decimals,
                venue.as_str(),
                creation_sig,
                creation_time.to_rfc3339(),
                creator,
            ],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) => {
                // Lost the race to a concurrent insert; re-read the winner.
                if is_unique_violation(&e) {
                    conn.query_row(
                        "SELECT id FROM tokens WHERE mint_address = ?1",
                        params![mint_address],
                        |row| row.get(0),
                    )
                    .map_err(CoreError::from)
                } else {
                    Err(CoreError::from(e))
                }
            }
        }
    }

    pub fn update_token(&self, token_id: i64, update: &TokenUpdate) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        if let Some(symbol) = &update.symbol {
            conn.execute("UPDATE tokens SET symbol = ?1 WHERE id = ?2", params![symbol, token_id])
                .map_err(CoreError::from)?;
        }
        if let Some(name) = &update.name {
            conn.execute("UPDATE tokens SET name = ?1 WHERE id = ?2", params![name, token_id])
                .map_err(CoreError::from)?;
        }
        Ok(())
    }

    /// Sets `isGraduated`; once true it never reverts (spec §8 monotonicity).
    pub fn mark_token_graduated(
        &self,
        token_id: i64,
        graduation_sig: &str,
        graduation_time: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        let already: bool = conn
            .query_row("SELECT is_graduated FROM tokens WHERE id = ?1", params![token_id], |row| {
                row.get(0)
            })
            .map_err(CoreError::from)?;
        if already {
            logger::debug(LogTag::Store, &format!("token {token_id} already graduated, ignoring"));
            return Ok(());
        }
        conn.execute(
            "UPDATE tokens SET is_graduated = 1, graduation_sig = ?1, graduation_time = ?2 WHERE id = ?3",
            params![graduation_sig, graduation_time.to_rfc3339(), token_id],
        )
        .map_err(CoreError::from)?;
        Ok(())
    }

    pub fn get_token_by_mint(&self, mint_address: &str) -> Result<Option<Token>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, mint_address, symbol, name, decimals, venue, creation_sig, creation_time,
                    creator, is_graduated, graduation_sig, graduation_time
             FROM tokens WHERE mint_address = ?1",
            params![mint_address],
            row_to_token,
        )
        .optional()
        .map_err(CoreError::from)
    }

    pub fn get_token(&self, token_id: i64) -> Result<Option<Token>, CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, mint_address, symbol, name, decimals, venue, creation_sig, creation_time,
                    creator, is_graduated, graduation_sig, graduation_time
             FROM tokens WHERE id = ?1",
            params![token_id],
            row_to_token,
        )
        .optional()
        .map_err(CoreError::from)
    }
}

fn row_to_token(row: &rusqlite::Row) -> rusqlite::Result<Token> {
    let venue_str: String = row.get(5)?;
    let creation_time: String = row.get(7)?;
    let graduation_time: Option<String> = row.get(11)?;
    Ok(Token {
        id: row.get(0)?,
        mint_address: row.get(1)?,
        symbol: row.get(2)?,
        name: row.get(3)?,
        decimals: row.get(4)?,
        venue: Venue::from_str(&venue_str).unwrap_or(Venue::PumpFun),
        creation_sig: row.get(6)?,
        creation_time: DateTime::parse_from_rfc3339(&creation_time)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        creator: row.get(8)?,
        is_graduated: row.get::<_, i64>(9)? != 0,
        graduation_sig: row.get(10)?,
        graduation_time: graduation_time.and_then(|s| {
            DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.with_timezone(&Utc))
        }),
    })
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
