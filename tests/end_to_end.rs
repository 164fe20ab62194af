//! End-to-end scenarios from spec §8, exercised through the Reconciler's
//! single `handle` entry point against a real in-memory store rather than
//! mocking the SQL layer (same preference the teacher's own test suite
//! shows for its price-monitor/decoder integration tests).

use std::sync::Arc;

use chrono::Utc;

use core_pipeline::config::ReconcilerConfig;
use core_pipeline::decode::types::{
    Graduated, NormalizedRecord, PoolCreated, TargetAmm, TokenCreated, TradeMetadata, TradeRecord,
};
use core_pipeline::metrics::Counters;
use core_pipeline::reconciler::Reconciler;
use core_pipeline::store::{PoolStatus, Store, TradeType, Venue};

fn harness() -> (Reconciler, Arc<Store>, Arc<Counters>) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let counters = Arc::new(Counters::new());
    let reconciler = Reconciler::new(store.clone(), ReconcilerConfig::for_tests(), counters.clone());
    (reconciler, store, counters)
}

fn trade_count_for_token(store: &Store, token_id: i64) -> u64 {
    let from = Utc::now() - chrono::Duration::hours(1);
    let to = Utc::now() + chrono::Duration::minutes(1);
    store
        .query_candles(token_id, from, to)
        .unwrap()
        .iter()
        .map(|c| c.trade_count)
        .sum()
}

#[tokio::test]
async fn cold_mint_then_pool_then_trade_is_recorded() {
    let (reconciler, store, _counters) = harness();

    reconciler
        .handle(
            "mint_detector",
            NormalizedRecord::TokenCreated(TokenCreated {
                mint: "M1".to_string(),
                creator: "creator1".to_string(),
                creation_sig: "SIG0".to_string(),
                venue: Venue::RaydiumLaunchpad,
            }),
        )
        .await;

    reconciler
        .handle(
            "launchpad_account",
            NormalizedRecord::PoolCreated(PoolCreated {
                pool_address: "P1".to_string(),
                base_mint: "M1".to_string(),
                quote_mint: "WSOL".to_string(),
                venue: Venue::RaydiumLaunchpad,
            }),
        )
        .await;

    reconciler
        .handle(
            "launchpad_transactions",
            NormalizedRecord::TradeRecord(TradeRecord {
                mint: "M1".to_string(),
                pool_address: "P1".to_string(),
                signature: "SIG1".to_string(),
                slot: 1,
                block_time: Utc::now(),
                kind: TradeType::Buy,
                user: "wallet1".to_string(),
                sol_amount: 1_000_000_000,
                token_amount: 100_000_000,
                pre_base_reserves: 0,
                pre_quote_reserves: 0,
                post_base_reserves: 100_000_000,
                post_quote_reserves: 1_000_000_000,
                metadata: TradeMetadata::default(),
            }),
        )
        .await;

    reconciler.flush_all().await;

    let token = store.get_token_by_mint("M1").unwrap().unwrap();
    assert_eq!(token.venue, Venue::RaydiumLaunchpad);

    let since = Utc::now() - chrono::Duration::hours(1);
    let pools = store.get_pools_for_token_since(token.id, since).unwrap();
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].token_id, token.id);

    assert_eq!(trade_count_for_token(&store, token.id), 1);
}

#[tokio::test]
async fn duplicate_trade_signature_is_recorded_once() {
    let (reconciler, store, counters) = harness();

    reconciler
        .handle(
            "mint_detector",
            NormalizedRecord::TokenCreated(TokenCreated {
                mint: "M2".to_string(),
                creator: "creator2".to_string(),
                creation_sig: "SIG0".to_string(),
                venue: Venue::PumpFun,
            }),
        )
        .await;
    reconciler
        .handle(
            "pumpfun_bonding_curve",
            NormalizedRecord::PoolCreated(PoolCreated {
                pool_address: "P2".to_string(),
                base_mint: "M2".to_string(),
                quote_mint: "WSOL".to_string(),
                venue: Venue::PumpFun,
            }),
        )
        .await;

    let block_time = Utc::now();
    let trade = || TradeRecord {
        mint: "M2".to_string(),
        pool_address: "P2".to_string(),
        signature: "SIG1".to_string(),
        slot: 1,
        block_time,
        kind: TradeType::Buy,
        user: "wallet1".to_string(),
        sol_amount: 1,
        token_amount: 1,
        pre_base_reserves: 0,
        pre_quote_reserves: 0,
        post_base_reserves: 1,
        post_quote_reserves: 1,
        metadata: TradeMetadata::default(),
    };

    reconciler.handle("pumpfun_trade", NormalizedRecord::TradeRecord(trade())).await;
    reconciler.handle("pumpfun_trade", NormalizedRecord::TradeRecord(trade())).await;
    reconciler.flush_all().await;

    let token = store.get_token_by_mint("M2").unwrap().unwrap();
    assert_eq!(trade_count_for_token(&store, token.id), 1);
    assert_eq!(counters.snapshot().transactions_appended, 1);
}

#[tokio::test]
async fn pool_venue_conflict_is_rejected_and_counted() {
    let (reconciler, store, counters) = harness();

    reconciler
        .handle(
            "mint_detector",
            NormalizedRecord::TokenCreated(TokenCreated {
                mint: "M3".to_string(),
                creator: "creator3".to_string(),
                creation_sig: "SIG0".to_string(),
                venue: Venue::RaydiumLaunchpad,
            }),
        )
        .await;

    reconciler
        .handle(
            "pumpswap",
            NormalizedRecord::PoolCreated(PoolCreated {
                pool_address: "P3".to_string(),
                base_mint: "M3".to_string(),
                quote_mint: "WSOL".to_string(),
                venue: Venue::PumpSwap,
            }),
        )
        .await;

    let token = store.get_token_by_mint("M3").unwrap().unwrap();
    let since = Utc::now() - chrono::Duration::hours(1);
    let pools = store.get_pools_for_token_since(token.id, since).unwrap();
    assert!(pools.is_empty());
    assert_eq!(counters.snapshot().invariant_violation, 1);
}

#[tokio::test]
async fn graduation_links_to_matching_pool_within_window() {
    let (reconciler, store, _counters) = harness();

    reconciler
        .handle(
            "mint_detector",
            NormalizedRecord::TokenCreated(TokenCreated {
                mint: "M4".to_string(),
                creator: "creator4".to_string(),
                creation_sig: "SIG0".to_string(),
                venue: Venue::PumpFun,
            }),
        )
        .await;
    reconciler
        .handle(
            "graduation_detector",
            NormalizedRecord::PoolCreated(PoolCreated {
                pool_address: "P4".to_string(),
                base_mint: "M4".to_string(),
                quote_mint: "WSOL".to_string(),
                venue: Venue::Raydium,
            }),
        )
        .await;

    reconciler
        .handle(
            "graduation_detector",
            NormalizedRecord::Graduated(Graduated {
                mint: "M4".to_string(),
                target_amm: TargetAmm::Raydium,
                graduation_sig: "GRADSIG".to_string(),
            }),
        )
        .await;

    let token = store.get_token_by_mint("M4").unwrap().unwrap();
    assert!(token.is_graduated);
    assert_eq!(token.graduation_sig.as_deref(), Some("GRADSIG"));

    let since = Utc::now() - chrono::Duration::hours(1);
    let pools = store.get_pools_for_token_since(token.id, since).unwrap();
    let graduated_pool = pools.iter().find(|p| p.pool_address == "P4").unwrap();
    assert_eq!(graduated_pool.status, PoolStatus::Graduated);
}
