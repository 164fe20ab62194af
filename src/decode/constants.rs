//! Venue-specific constants referenced by the progress formulas (spec §4.3).

/// PumpFun bonding-curve initial virtual token reserves: 1.073e9 tokens at
/// 1e6 base-unit scale.
pub const PUMPFUN_INITIAL_VIRTUAL_TOKEN_RESERVES: u64 = 1_073_000_000 * 1_000_000;

/// PumpFun total sellable tokens before graduation: 7.931e8 tokens at 1e6
/// base-unit scale.
pub const PUMPFUN_TOTAL_SELLABLE_TOKENS: u64 = 793_100_000 * 1_000_000;

pub const SOL_DECIMALS: u8 = 9;
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Program ids each consumer subscribes against (spec §4.3's consumer
/// catalogue), one constant per venue so a filter change touches one line.
pub const PUMPFUN_PROGRAM: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
pub const PUMPSWAP_PROGRAM: &str = "pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA";
pub const RAYDIUM_LAUNCHPAD_PROGRAM: &str = "LanMV9sAd7wArD4vJFi2qDdfnVhFxYSUg6eADduJ3uj";
pub const MIGRATION_PROGRAM: &str = "39azUYFWPz3VHgKCf3VChUwbpURdCHRxjWVowf5jUJjg";
