//! Persistent store: entity tables, append-only event tables, and the
//! derived analytical queries (spec §4.1). Grounded on the teacher's
//! `database/` module split (one file per concern, a shared `Mutex<Connection>`
//! wrapper) but re-keyed to this domain's schema.

pub mod connection;
pub mod holder;
pub mod models;
pub mod pools;
pub mod sol_price;
pub mod tokens;
pub mod transactions;
pub mod wallet;

pub use connection::Store;
pub use models::{
    Candle, HolderScore, Pool, PoolReservesUpdate, PoolStatus, SolUsdPrice, Token, TokenUpdate,
    TradeType, Transaction, Venue, WalletAnalysis,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn append_transaction_is_idempotent() {
        let store = store();
        let token_id = store
            .upsert_token("M1", "SYM", "Name", 6, Venue::RaydiumLaunchpad, "SIG0", Utc::now(), "creator")
            .unwrap();
        let pool_id = store.upsert_pool("P1", token_id, "M1", "WSOL", Venue::RaydiumLaunchpad).unwrap();

        let tx = Transaction {
            signature: "SIG1".to_string(),
            block_time: Utc::now(),
            pool_id,
            token_id,
            slot: 1,
            kind: TradeType::Buy,
            user: "wallet1".to_string(),
            sol_amount: 1_000_000_000,
            token_amount: 100_000_000,
            price_per_token: Some(0.01),
            pre_base_reserves: 0,
            pre_quote_reserves: 0,
            post_base_reserves: 100_000_000,
            post_quote_reserves: 1_000_000_000,
            fees: 0,
            raw_metadata: None,
        };

        assert!(store.append_transaction(&tx).unwrap());
        assert!(!store.append_transaction(&tx).unwrap());

        let count: i64 = store
            .conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn upsert_token_race_yields_one_row_and_same_id() {
        let store = store();
        let id_a = store
            .upsert_token("M2", "SYM", "Name", 6, Venue::PumpFun, "SIG0", Utc::now(), "creator")
            .unwrap();
        let id_b = store
            .upsert_token("M2", "SYM2", "Name2", 6, Venue::PumpFun, "SIG0", Utc::now(), "creator")
            .unwrap();
        assert_eq!(id_a, id_b);

        let count: i64 = store
            .conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM tokens WHERE mint_address = 'M2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn pool_venue_mismatch_is_rejected() {
        let store = store();
        let token_id = store
            .upsert_token("M3", "SYM", "Name", 6, Venue::RaydiumLaunchpad, "SIG0", Utc::now(), "creator")
            .unwrap();
        let result = store.upsert_pool("P3", token_id, "M3", "WSOL", Venue::PumpSwap);
        assert!(matches!(result, Err(crate::errors::CoreError::InvariantViolation(_))));
    }

    #[test]
    fn graduation_is_monotonic() {
        let store = store();
        let token_id = store
            .upsert_token("M4", "SYM", "Name", 6, Venue::PumpFun, "SIG0", Utc::now(), "creator")
            .unwrap();
        store.mark_token_graduated(token_id, "GRADSIG", Utc::now()).unwrap();
        let token = store.get_token(token_id).unwrap().unwrap();
        assert!(token.is_graduated);
        assert_eq!(token.graduation_sig.as_deref(), Some("GRADSIG"));

        // A second, different signature must not overwrite the first.
        store.mark_token_graduated(token_id, "OTHERSIG", Utc::now()).unwrap();
        let token = store.get_token(token_id).unwrap().unwrap();
        assert_eq!(token.graduation_sig.as_deref(), Some("GRADSIG"));
    }

    #[test]
    fn candle_matches_source_aggregation() {
        let store = store();
        let token_id = store
            .upsert_token("M5", "SYM", "Name", 6, Venue::PumpFun, "SIG0", Utc::now(), "creator")
            .unwrap();
        let pool_id = store.upsert_pool("P5", token_id, "M5", "WSOL", Venue::PumpFun).unwrap();

        let minute = Utc::now();
        for (i, (kind, price, sol, tok)) in [
            (TradeType::Buy, 0.01, 1_000_000_000u64, 100_000_000u64),
            (TradeType::Sell, 0.012, 500_000_000, 40_000_000),
        ]
        .into_iter()
        .enumerate()
        {
            store
                .append_transaction(&Transaction {
                    signature: format!("SIG{i}"),
                    block_time: minute,
                    pool_id,
                    token_id,
                    slot: i as u64,
                    kind,
                    user: format!("wallet{i}"),
                    sol_amount: sol,
                    token_amount: tok,
                    price_per_token: Some(price),
                    pre_base_reserves: 0,
                    pre_quote_reserves: 0,
                    post_base_reserves: 0,
                    post_quote_reserves: 0,
                    fees: 0,
                    raw_metadata: None,
                })
                .unwrap();
        }

        let from = minute - chrono::Duration::minutes(1);
        let to = minute + chrono::Duration::minutes(1);
        let candles = store.query_candles(token_id, from, to).unwrap();
        assert_eq!(candles.len(), 1);
        let candle = &candles[0];
        assert_eq!(candle.trade_count, 2);
        assert_eq!(candle.volume_sol, 1_500_000_000);
        assert_eq!(candle.buyer_count, 1);
        assert_eq!(candle.seller_count, 1);
    }
}
