//! LaunchpadTransactions (spec §4.3 item 3): buy/sell trades against a
//! RaydiumLaunchpad pool, with event-authoritative in/out amounts (spec
//! §4.3.1 — never derived from instruction min/max bounds).
//!
//! The launchpad program emits an Anchor event with the same discriminator
//! shape PumpFun uses (mint, quote amount, base amount, direction, user,
//! reserves snapshot), so trade events are decoded with the same routine as
//! `pumpfun_trade` rather than a second bespoke layout.

use chrono::{TimeZone, Utc};

use crate::decode::constants::RAYDIUM_LAUNCHPAD_PROGRAM;
use crate::decode::events::extract_program_data;
use crate::decode::pumpfun::decode_trade_event;
use crate::decode::types::{NormalizedRecord, TradeMetadata, TradeRecord};
use crate::feed::{SubscriptionFilter, Update};
use crate::store::TradeType;

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_transaction_accounts([RAYDIUM_LAUNCHPAD_PROGRAM.to_string()])
}

pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Transaction(tx) = update else { return Vec::new() };
    if tx.err {
        return Vec::new();
    }

    let Some(pool_address) = tx
        .account_keys
        .iter()
        .find(|key| key.as_str() != RAYDIUM_LAUNCHPAD_PROGRAM)
        .cloned()
    else {
        return Vec::new();
    };

    extract_program_data(&tx.log_messages)
        .into_iter()
        .filter_map(|payload| decode_trade_event(&payload).ok())
        .map(|event| {
            NormalizedRecord::TradeRecord(TradeRecord {
                mint: event.mint.to_string(),
                pool_address: pool_address.clone(),
                signature: tx.signature.clone(),
                slot: tx.slot,
                block_time: tx
                    .block_time
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .unwrap_or_else(Utc::now),
                kind: if event.is_buy { TradeType::Buy } else { TradeType::Sell },
                user: event.user.to_string(),
                sol_amount: event.sol_amount,
                token_amount: event.token_amount,
                pre_base_reserves: 0,
                pre_quote_reserves: 0,
                post_base_reserves: event.virtual_token_reserves,
                post_quote_reserves: event.virtual_sol_reserves,
                metadata: TradeMetadata { success: true, ..Default::default() },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TransactionUpdate;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use solana_sdk::pubkey::Pubkey;

    fn event_log(is_buy: bool) -> String {
        let event = crate::decode::pumpfun::TradeEvent {
            mint: Pubkey::new_unique(),
            sol_amount: 2_000_000_000,
            token_amount: 100_000_000_000,
            is_buy,
            user: Pubkey::new_unique(),
            timestamp: 1_700_000_000,
            virtual_sol_reserves: 40_000_000_000,
            virtual_token_reserves: 500_000_000_000_000,
            real_sol_reserves: 35_000_000_000,
            real_token_reserves: 450_000_000_000_000,
        };
        let mut payload = vec![0u8; 8];
        payload.extend(borsh::to_vec(&event).unwrap());
        format!("Program data: {}", STANDARD.encode(payload))
    }

    #[test]
    fn decodes_trade_from_event_log() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: Some(1_700_000_000),
            is_vote: false,
            err: false,
            account_keys: vec!["POOL1".to_string(), RAYDIUM_LAUNCHPAD_PROGRAM.to_string()],
            log_messages: vec![event_log(true)],
        });
        let records = decode(update);
        assert_eq!(records.len(), 1);
        let NormalizedRecord::TradeRecord(trade) = &records[0] else { panic!("expected trade") };
        assert_eq!(trade.kind, TradeType::Buy);
        assert_eq!(trade.sol_amount, 2_000_000_000);
    }

    #[test]
    fn no_event_logs_yield_no_trades() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: None,
            is_vote: false,
            err: false,
            account_keys: vec!["POOL1".to_string()],
            log_messages: vec!["Program log: Instruction: AddLiquidity".to_string()],
        });
        assert!(decode(update).is_empty());
    }
}
