//! PumpFunBondingCurveAccount (spec §4.3 item 5): every bonding-curve
//! account update produces a `PoolStateUpdate`; a `complete` flag flip also
//! emits `BondingCurveComplete`.

use crate::decode::pumpfun::{bonding_curve_complete, decode_bonding_curve_account, pool_state_update};
use crate::decode::types::NormalizedRecord;
use crate::feed::{SubscriptionFilter, Update};
use crate::logger::{self, LogTag};

use crate::decode::constants::PUMPFUN_PROGRAM;

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_owner(PUMPFUN_PROGRAM)
}

pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Account(account) = update else { return Vec::new() };

    let decoded = match decode_bonding_curve_account(&account.data) {
        Ok(decoded) => decoded,
        Err(e) => {
            logger::debug(LogTag::Consumer, &format!("bonding curve decode skipped for {}: {e}", account.pubkey));
            return Vec::new();
        }
    };

    let mut records = vec![NormalizedRecord::PoolStateUpdate(pool_state_update(&account.pubkey, &decoded))];
    if let Some(complete) = bonding_curve_complete(&account.pubkey, &decoded) {
        records.push(NormalizedRecord::BondingCurveComplete(complete));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::AccountUpdate;
    use solana_sdk::pubkey::Pubkey;

    fn account_bytes(complete: bool) -> Vec<u8> {
        let account = crate::decode::pumpfun::BondingCurveAccount {
            virtual_token_reserves: 900_000_000_000_000,
            virtual_sol_reserves: 35_000_000_000,
            real_token_reserves: 800_000_000_000_000,
            real_sol_reserves: 30_000_000_000,
            token_total_supply: 1_000_000_000_000_000,
            complete,
            creator: Pubkey::default(),
        };
        let mut bytes = vec![0u8; 8];
        bytes.extend(borsh::to_vec(&account).unwrap());
        bytes
    }

    #[test]
    fn emits_pool_state_update_only_when_not_complete() {
        let update = Update::Account(AccountUpdate {
            pubkey: "CURVE1".to_string(),
            owner: PUMPFUN_PROGRAM.to_string(),
            lamports: 1,
            data: account_bytes(false),
            slot: 1,
        });
        let records = decode(update);
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], NormalizedRecord::PoolStateUpdate(_)));
    }

    #[test]
    fn emits_both_when_complete() {
        let update = Update::Account(AccountUpdate {
            pubkey: "CURVE1".to_string(),
            owner: PUMPFUN_PROGRAM.to_string(),
            lamports: 1,
            data: account_bytes(true),
            slot: 1,
        });
        let records = decode(update);
        assert_eq!(records.len(), 2);
        assert!(matches!(records[1], NormalizedRecord::BondingCurveComplete(_)));
    }

    #[test]
    fn short_account_data_is_skipped() {
        let update = Update::Account(AccountUpdate {
            pubkey: "CURVE1".to_string(),
            owner: PUMPFUN_PROGRAM.to_string(),
            lamports: 1,
            data: vec![0u8; 4],
            slot: 1,
        });
        assert!(decode(update).is_empty());
    }
}
