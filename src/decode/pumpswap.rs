//! PumpSwap post-graduation AMM decoding (spec §4.3 item 7): pool creation,
//! trades, and reserve-derived price updates for tokens that graduated into
//! PumpSwap rather than Raydium.

use crate::decode::price::price_from_reserves;
use crate::decode::types::{PoolCreated, PriceUpdate, TradeMetadata, TradeRecord};
use crate::store::{TradeType, Venue};

pub fn pool_created(pool_address: &str, base_mint: &str, quote_mint: &str) -> PoolCreated {
    PoolCreated {
        pool_address: pool_address.to_string(),
        base_mint: base_mint.to_string(),
        quote_mint: quote_mint.to_string(),
        venue: Venue::PumpSwap,
    }
}

/// Event-authoritative trade construction (spec §4.3.1): amounts always come
/// from the event payload, never from instruction min/max bounds.
#[allow(clippy::too_many_arguments)]
pub fn trade_record(
    mint: &str,
    pool_address: &str,
    signature: &str,
    slot: u64,
    block_time: chrono::DateTime<chrono::Utc>,
    kind: TradeType,
    user: &str,
    event_sol_amount: u64,
    event_token_amount: u64,
    pre_reserves: (u64, u64),
    post_reserves: (u64, u64),
) -> TradeRecord {
    TradeRecord {
        mint: mint.to_string(),
        pool_address: pool_address.to_string(),
        signature: signature.to_string(),
        slot,
        block_time,
        kind,
        user: user.to_string(),
        sol_amount: event_sol_amount,
        token_amount: event_token_amount,
        pre_base_reserves: pre_reserves.0,
        pre_quote_reserves: pre_reserves.1,
        post_base_reserves: post_reserves.0,
        post_quote_reserves: post_reserves.1,
        metadata: TradeMetadata { success: true, ..Default::default() },
    }
}

pub fn price_update(
    pool_address: &str,
    base_reserves: u64,
    quote_reserves: u64,
    base_decimals: u8,
) -> PriceUpdate {
    PriceUpdate {
        pool_address: pool_address.to_string(),
        price: price_from_reserves(
            base_reserves,
            quote_reserves,
            base_decimals,
            crate::decode::constants::SOL_DECIMALS,
        ),
    }
}
