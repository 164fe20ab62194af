//! Venue-neutral decoding contracts (spec §4.3.1): reserve-to-price
//! conversion and the two venues' progress formulas. Pure functions, unit
//! tested directly — no I/O, no RPC, no account bytes.

use crate::decode::constants::{PUMPFUN_INITIAL_VIRTUAL_TOKEN_RESERVES, PUMPFUN_TOTAL_SELLABLE_TOKENS};

/// `price = (quoteReserves / 10^quoteDecimals) / (baseReserves / 10^baseDecimals)`.
/// Zero reserves make price undefined, never zero.
pub fn price_from_reserves(
    base_reserves: u64,
    quote_reserves: u64,
    base_decimals: u8,
    quote_decimals: u8,
) -> Option<f64> {
    if base_reserves == 0 || quote_reserves == 0 {
        return None;
    }
    let base = base_reserves as f64 / 10f64.powi(base_decimals as i32);
    let quote = quote_reserves as f64 / 10f64.powi(quote_decimals as i32);
    Some(quote / base)
}

/// Raydium launchpad progress: real quote raised over the fund-raising
/// target, clamped to `[0,100]`.
pub fn raydium_launchpad_progress(real_quote_reserves: u64, total_quote_fund_raising: u64) -> f64 {
    if total_quote_fund_raising == 0 {
        return 0.0;
    }
    let pct = real_quote_reserves as f64 / total_quote_fund_raising as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// PumpFun progress: tokens sold out of the bonding curve's sellable supply,
/// clamped to `[0,100]`.
pub fn pumpfun_progress(virtual_token_reserves: u64) -> f64 {
    let sold = PUMPFUN_INITIAL_VIRTUAL_TOKEN_RESERVES.saturating_sub(virtual_token_reserves);
    let pct = sold as f64 / PUMPFUN_TOTAL_SELLABLE_TOKENS as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reserves_are_undefined_not_zero() {
        assert_eq!(price_from_reserves(0, 100, 6, 9), None);
        assert_eq!(price_from_reserves(100, 0, 6, 9), None);
    }

    #[test]
    fn price_matches_reserve_ratio() {
        let price = price_from_reserves(100_000_000, 1_000_000_000, 6, 9).unwrap();
        assert!((price - 0.01).abs() < 1e-12);
    }

    #[test]
    fn pumpfun_progress_bounds() {
        assert_eq!(pumpfun_progress(PUMPFUN_INITIAL_VIRTUAL_TOKEN_RESERVES), 0.0);
        let fully_sold = PUMPFUN_INITIAL_VIRTUAL_TOKEN_RESERVES.saturating_sub(PUMPFUN_TOTAL_SELLABLE_TOKENS);
        assert_eq!(pumpfun_progress(fully_sold), 100.0);
    }

    #[test]
    fn raydium_progress_clamps_above_target() {
        assert_eq!(raydium_launchpad_progress(200, 100), 100.0);
        assert_eq!(raydium_launchpad_progress(0, 100), 0.0);
    }
}
