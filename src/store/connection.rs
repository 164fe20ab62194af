use rusqlite::Connection;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::logger::{self, LogTag};

/// Pooled-in-spirit wrapper around a single sqlite connection. A real
/// deployment would front this with a connection pool (the `DB_URL` config
/// key is the seam); a single mutex-guarded connection is what the teacher
/// itself ships, and sqlite's own locking makes pooling secondary to
/// correctness here.
pub struct Store {
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    pub fn open(db_url: &str) -> Result<Self, CoreError> {
        let conn = Connection::open(db_url)
            .map_err(|e| CoreError::Config(format!("failed to open store at {db_url}: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CoreError::Config(format!("failed to set WAL mode: {e}")))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| CoreError::Config(format!("failed to enable foreign keys: {e}")))?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        logger::info(LogTag::Store, &format!("opened store at {db_url}"));
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::open(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)
            .map_err(|e| CoreError::Config(format!("failed to initialize schema: {e}")))?;
        Ok(())
    }

    /// Closes the underlying connection. Called from the shutdown sequence's
    /// "close store connections" phase.
    pub fn close(&self) {
        logger::info(LogTag::Store, "closing store connections");
    }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tokens (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    mint_address TEXT NOT NULL UNIQUE,
    symbol TEXT NOT NULL,
    name TEXT NOT NULL,
    decimals INTEGER NOT NULL,
    venue TEXT NOT NULL,
    creation_sig TEXT NOT NULL,
    creation_time TEXT NOT NULL,
    creator TEXT NOT NULL,
    is_graduated INTEGER NOT NULL DEFAULT 0,
    graduation_sig TEXT,
    graduation_time TEXT
);

CREATE TABLE IF NOT EXISTS pools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pool_address TEXT NOT NULL UNIQUE,
    token_id INTEGER NOT NULL REFERENCES tokens(id),
    base_mint TEXT NOT NULL,
    quote_mint TEXT NOT NULL,
    venue TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    virtual_base_reserves INTEGER NOT NULL DEFAULT 0,
    virtual_quote_reserves INTEGER NOT NULL DEFAULT 0,
    real_base_reserves INTEGER NOT NULL DEFAULT 0,
    real_quote_reserves INTEGER NOT NULL DEFAULT 0,
    bonding_curve_progress REAL,
    latest_price REAL,
    latest_price_usd REAL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pools_token_id ON pools(token_id);

CREATE TABLE IF NOT EXISTS transactions (
    signature TEXT NOT NULL,
    block_time TEXT NOT NULL,
    pool_id INTEGER NOT NULL REFERENCES pools(id),
    token_id INTEGER NOT NULL REFERENCES tokens(id),
    slot INTEGER NOT NULL,
    kind TEXT NOT NULL,
    user TEXT NOT NULL,
    sol_amount INTEGER NOT NULL,
    token_amount INTEGER NOT NULL,
    price_per_token REAL,
    pre_base_reserves INTEGER NOT NULL,
    pre_quote_reserves INTEGER NOT NULL,
    post_base_reserves INTEGER NOT NULL,
    post_quote_reserves INTEGER NOT NULL,
    fees INTEGER NOT NULL DEFAULT 0,
    raw_metadata TEXT,
    PRIMARY KEY (signature, block_time)
);

CREATE INDEX IF NOT EXISTS idx_transactions_token_time ON transactions(token_id, block_time);

CREATE TABLE IF NOT EXISTS sol_usd_prices (
    price_time TEXT PRIMARY KEY,
    price_usd REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS holder_scores (
    token_id INTEGER NOT NULL REFERENCES tokens(id),
    score_time TEXT NOT NULL,
    distribution_score INTEGER NOT NULL,
    quality_score INTEGER NOT NULL,
    activity_score INTEGER NOT NULL,
    total_score INTEGER NOT NULL,
    gini REAL NOT NULL,
    top1_pct_concentration REAL NOT NULL,
    holder_count INTEGER NOT NULL,
    bot_ratio REAL NOT NULL,
    smart_money_ratio REAL NOT NULL,
    credits_used INTEGER NOT NULL,
    PRIMARY KEY (token_id, score_time)
);

CREATE TABLE IF NOT EXISTS wallet_analyses (
    wallet_address TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    last_active TEXT NOT NULL,
    tx_count INTEGER NOT NULL,
    sol_balance INTEGER NOT NULL,
    wallet_age_days REAL NOT NULL,
    is_bot INTEGER NOT NULL,
    is_smart_money INTEGER NOT NULL,
    risk_score REAL NOT NULL,
    last_analyzed TEXT NOT NULL
);
"#;
