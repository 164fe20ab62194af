//! PumpFun bonding-curve account decoding (spec §4.3 items 4 & 5), grounded
//! on the teacher's Anchor-discriminator-skip + borsh deserialize pattern.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use crate::decode::price::pumpfun_progress;
use crate::decode::types::{BondingCurveComplete, PoolStateUpdate};

const ANCHOR_DISCRIMINATOR_LEN: usize = 8;
const MIN_ACCOUNT_LEN: usize = ANCHOR_DISCRIMINATOR_LEN + 8 + 8 + 8 + 8 + 8 + 1 + 32;

/// Fields of the program's `TradeEvent`, in emission order (spec §4.3.1:
/// trade amounts are event-authoritative, never taken from instruction
/// min/max bounds).
#[derive(Debug, Clone, BorshDeserialize, borsh::BorshSerialize)]
pub struct TradeEvent {
    pub mint: Pubkey,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: Pubkey,
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub real_token_reserves: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum TradeEventDecodeError {
    #[error("trade event payload too short: {0} bytes")]
    TooShort(usize),
    #[error("borsh deserialize failed: {0}")]
    Borsh(String),
}

/// Decodes one `Program data:` payload (already base64-decoded) into a
/// `TradeEvent`. Callers fetch candidate payloads via
/// `decode::events::extract_program_data` and try each until one decodes.
pub fn decode_trade_event(payload: &[u8]) -> Result<TradeEvent, TradeEventDecodeError> {
    if payload.len() <= ANCHOR_DISCRIMINATOR_LEN {
        return Err(TradeEventDecodeError::TooShort(payload.len()));
    }
    TradeEvent::try_from_slice(&payload[ANCHOR_DISCRIMINATOR_LEN..])
        .map_err(|e| TradeEventDecodeError::Borsh(e.to_string()))
}

#[derive(Debug, Clone, BorshDeserialize, borsh::BorshSerialize)]
pub struct BondingCurveAccount {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
    pub creator: Pubkey,
}

#[derive(Debug, thiserror::Error)]
pub enum PumpFunDecodeError {
    #[error("bonding curve account too short: {0} bytes (< {MIN_ACCOUNT_LEN})")]
    TooShort(usize),
    #[error("borsh deserialize failed: {0}")]
    Borsh(String),
}

pub fn decode_bonding_curve_account(data: &[u8]) -> Result<BondingCurveAccount, PumpFunDecodeError> {
    if data.len() < MIN_ACCOUNT_LEN {
        return Err(PumpFunDecodeError::TooShort(data.len()));
    }
    BondingCurveAccount::try_from_slice(&data[ANCHOR_DISCRIMINATOR_LEN..])
        .map_err(|e| PumpFunDecodeError::Borsh(e.to_string()))
}

/// Builds the `PoolStateUpdate` a consumer emits for every bonding-curve
/// account it sees, applying the PumpFun progress formula (spec §4.3).
pub fn pool_state_update(pool_address: &str, account: &BondingCurveAccount) -> PoolStateUpdate {
    let progress = pumpfun_progress(account.virtual_token_reserves);
    let price = crate::decode::price::price_from_reserves(
        account.virtual_token_reserves,
        account.virtual_sol_reserves,
        crate::decode::constants::DEFAULT_TOKEN_DECIMALS,
        crate::decode::constants::SOL_DECIMALS,
    );
    PoolStateUpdate {
        pool_address: pool_address.to_string(),
        virtual_base_reserves: Some(account.virtual_token_reserves),
        virtual_quote_reserves: Some(account.virtual_sol_reserves),
        real_base_reserves: Some(account.real_token_reserves),
        real_quote_reserves: Some(account.real_sol_reserves),
        bonding_curve_progress: Some(progress),
        latest_price: price,
    }
}

/// Only emitted when `complete` flips true (spec §4.3 item 5).
pub fn bonding_curve_complete(
    bonding_curve_address: &str,
    account: &BondingCurveAccount,
) -> Option<BondingCurveComplete> {
    account.complete.then(|| BondingCurveComplete {
        bonding_curve_address: bonding_curve_address.to_string(),
        final_base_reserves: account.real_token_reserves,
        final_quote_reserves: account.real_sol_reserves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account_bytes(complete: bool) -> Vec<u8> {
        let account = BondingCurveAccount {
            virtual_token_reserves: 900_000_000_000_000,
            virtual_sol_reserves: 35_000_000_000,
            real_token_reserves: 800_000_000_000_000,
            real_sol_reserves: 30_000_000_000,
            token_total_supply: 1_000_000_000_000_000,
            complete,
            creator: Pubkey::default(),
        };
        let mut bytes = vec![0u8; ANCHOR_DISCRIMINATOR_LEN];
        bytes.extend(borsh::to_vec(&account).unwrap());
        bytes
    }

    #[test]
    fn decodes_round_trip() {
        let bytes = sample_account_bytes(false);
        let decoded = decode_bonding_curve_account(&bytes).unwrap();
        assert_eq!(decoded.virtual_sol_reserves, 35_000_000_000);
        assert!(!decoded.complete);
    }

    #[test]
    fn too_short_is_rejected() {
        assert!(matches!(decode_bonding_curve_account(&[0u8; 10]), Err(PumpFunDecodeError::TooShort(10))));
    }

    #[test]
    fn complete_flag_emits_event_only_when_set() {
        let incomplete = decode_bonding_curve_account(&sample_account_bytes(false)).unwrap();
        assert!(bonding_curve_complete("BC1", &incomplete).is_none());

        let complete = decode_bonding_curve_account(&sample_account_bytes(true)).unwrap();
        assert!(bonding_curve_complete("BC1", &complete).is_some());
    }

    #[test]
    fn decodes_trade_event_round_trip() {
        let event = TradeEvent {
            mint: Pubkey::new_unique(),
            sol_amount: 1_000_000_000,
            token_amount: 500_000_000_000,
            is_buy: true,
            user: Pubkey::new_unique(),
            timestamp: 1_700_000_000,
            virtual_sol_reserves: 30_000_000_000,
            virtual_token_reserves: 900_000_000_000_000,
            real_sol_reserves: 25_000_000_000,
            real_token_reserves: 800_000_000_000_000,
        };
        let mut payload = vec![0u8; ANCHOR_DISCRIMINATOR_LEN];
        payload.extend(borsh::to_vec(&event).unwrap());
        let decoded = decode_trade_event(&payload).unwrap();
        assert_eq!(decoded.sol_amount, 1_000_000_000);
        assert!(decoded.is_buy);
    }

    #[test]
    fn trade_event_payload_too_short_is_rejected() {
        assert!(matches!(decode_trade_event(&[0u8; 4]), Err(TradeEventDecodeError::TooShort(4))));
    }
}
