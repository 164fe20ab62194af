//! RaydiumLaunchpad account decoding (spec §4.3 items 1 & 2), grounded on
//! the teacher's offset-scan pattern for fixed-layout Anchor accounts
//! (base_mint/quote_mint/base_vault/quote_vault at a fixed post-header
//! offset, with a fallback offset for an older account layout).

use solana_sdk::pubkey::Pubkey;

use crate::decode::price::raydium_launchpad_progress;
use crate::decode::types::PoolStateUpdate;

const PUBKEY_LEN: usize = 32;
const PRIMARY_MINT_OFFSET: usize = 208;
const FALLBACK_MINT_OFFSET: usize = 205;

#[derive(Debug, thiserror::Error)]
pub enum LaunchpadDecodeError {
    #[error("launchpad account too short: {0} bytes")]
    TooShort(usize),
}

#[derive(Debug, Clone)]
pub struct LaunchpadMints {
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
}

pub fn decode_launchpad_mints(data: &[u8]) -> Result<LaunchpadMints, LaunchpadDecodeError> {
    let offset = if data.len() >= PRIMARY_MINT_OFFSET + PUBKEY_LEN * 4 {
        PRIMARY_MINT_OFFSET
    } else if data.len() >= FALLBACK_MINT_OFFSET + PUBKEY_LEN * 4 {
        FALLBACK_MINT_OFFSET
    } else {
        return Err(LaunchpadDecodeError::TooShort(data.len()));
    };

    let read_pubkey = |at: usize| Pubkey::new_from_array(data[at..at + PUBKEY_LEN].try_into().unwrap());
    Ok(LaunchpadMints {
        base_mint: read_pubkey(offset),
        quote_mint: read_pubkey(offset + PUBKEY_LEN),
        base_vault: read_pubkey(offset + PUBKEY_LEN * 2),
        quote_vault: read_pubkey(offset + PUBKEY_LEN * 3),
    })
}

/// Builds a `PoolStateUpdate` from live vault balances plus the fund-raising
/// target, applying the Raydium progress formula (spec §4.3 item 2).
pub fn pool_state_update(
    pool_address: &str,
    base_reserves: u64,
    quote_reserves: u64,
    total_quote_fund_raising: u64,
) -> PoolStateUpdate {
    let progress = raydium_launchpad_progress(quote_reserves, total_quote_fund_raising);
    let price = crate::decode::price::price_from_reserves(
        base_reserves,
        quote_reserves,
        crate::decode::constants::DEFAULT_TOKEN_DECIMALS,
        crate::decode::constants::SOL_DECIMALS,
    );
    PoolStateUpdate {
        pool_address: pool_address.to_string(),
        virtual_base_reserves: None,
        virtual_quote_reserves: None,
        real_base_reserves: Some(base_reserves),
        real_quote_reserves: Some(quote_reserves),
        bonding_curve_progress: Some(progress),
        latest_price: price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mints_at_primary_offset() {
        let mut data = vec![0u8; PRIMARY_MINT_OFFSET + PUBKEY_LEN * 4];
        let base = Pubkey::new_unique();
        data[PRIMARY_MINT_OFFSET..PRIMARY_MINT_OFFSET + PUBKEY_LEN].copy_from_slice(base.as_ref());
        let decoded = decode_launchpad_mints(&data).unwrap();
        assert_eq!(decoded.base_mint, base);
    }

    #[test]
    fn falls_back_to_older_offset_when_short() {
        let data = vec![0u8; FALLBACK_MINT_OFFSET + PUBKEY_LEN * 4];
        assert!(decode_launchpad_mints(&data).is_ok());
    }

    #[test]
    fn too_short_is_rejected() {
        assert!(matches!(decode_launchpad_mints(&[0u8; 10]), Err(LaunchpadDecodeError::TooShort(10))));
    }
}
