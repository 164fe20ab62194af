//! Tagged normalized records emitted by decoders, replacing the
//! runtime-reflection/duck-typed decoded structs the original system used
//! (spec §9 design note): decoders return one of these variants, consumers
//! pattern-match rather than probing fields that may or may not exist.

use crate::store::{TradeType, Venue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAmm {
    Raydium,
    PumpSwap,
    PumpFun,
}

#[derive(Debug, Clone)]
pub struct TokenCreated {
    pub mint: String,
    pub creator: String,
    pub creation_sig: String,
    pub venue: Venue,
}

#[derive(Debug, Clone)]
pub struct PoolCreated {
    pub pool_address: String,
    pub base_mint: String,
    pub quote_mint: String,
    pub venue: Venue,
}

/// Pre/post reserve snapshot and fee/success metadata captured alongside a
/// trade (spec §9's minimal structured `TradeMetadata`; everything beyond
/// this stays an opaque byte payload in `raw_metadata`, never queried hot).
#[derive(Debug, Clone, Default)]
pub struct TradeMetadata {
    pub fees: u64,
    pub success: bool,
    pub raw: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub mint: String,
    pub pool_address: String,
    pub signature: String,
    pub slot: u64,
    pub block_time: chrono::DateTime<chrono::Utc>,
    pub kind: TradeType,
    pub user: String,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub pre_base_reserves: u64,
    pub pre_quote_reserves: u64,
    pub post_base_reserves: u64,
    pub post_quote_reserves: u64,
    pub metadata: TradeMetadata,
}

#[derive(Debug, Clone)]
pub struct PoolStateUpdate {
    pub pool_address: String,
    pub virtual_base_reserves: Option<u64>,
    pub virtual_quote_reserves: Option<u64>,
    pub real_base_reserves: Option<u64>,
    pub real_quote_reserves: Option<u64>,
    pub bonding_curve_progress: Option<f64>,
    pub latest_price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BondingCurveComplete {
    pub bonding_curve_address: String,
    pub final_base_reserves: u64,
    pub final_quote_reserves: u64,
}

#[derive(Debug, Clone)]
pub struct Graduated {
    pub mint: String,
    pub target_amm: TargetAmm,
    pub graduation_sig: String,
}

#[derive(Debug, Clone)]
pub struct PriceUpdate {
    pub pool_address: String,
    pub price: Option<f64>,
}

/// What a Consumer sends to the Reconciler (spec §4.3/§4.4). One venue-
/// neutral enum so the Reconciler's dispatch is a single match, regardless
/// of which of the eight consumers produced the record.
#[derive(Debug, Clone)]
pub enum NormalizedRecord {
    TokenCreated(TokenCreated),
    PoolCreated(PoolCreated),
    TradeRecord(TradeRecord),
    PoolStateUpdate(PoolStateUpdate),
    BondingCurveComplete(BondingCurveComplete),
    Graduated(Graduated),
    PriceUpdate(PriceUpdate),
}
