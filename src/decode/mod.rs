//! On-chain payload decoders (spec §4.3/§4.3.1). Each decoder is a pure
//! function `bytes -> decoded struct`; venue byte layouts are grounded on
//! the teacher's `pools/pumpfun2.rs` and `pools/raydium_launchpad.rs`, but
//! decoders here never touch the network — RPC/account fetching stays in
//! the consumer that calls them.

pub mod constants;
pub mod events;
pub mod graduation;
pub mod price;
pub mod pumpfun;
pub mod pumpswap;
pub mod raydium_launchpad;
pub mod types;

pub use types::{
    BondingCurveComplete, Graduated, NormalizedRecord, PoolCreated, PoolStateUpdate, PriceUpdate,
    TargetAmm, TokenCreated, TradeMetadata, TradeRecord,
};
