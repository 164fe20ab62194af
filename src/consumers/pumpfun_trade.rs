//! PumpFunTrade (spec §4.3 item 4): buy/sell trades on the bonding curve,
//! paired with the reserve-derived `PoolStateUpdate` the same transaction
//! implies (spec §4.3's progress rule: tokens sold / total sellable).

use chrono::{TimeZone, Utc};

use crate::decode::constants::PUMPFUN_PROGRAM;
use crate::decode::events::extract_program_data;
use crate::decode::price::{price_from_reserves, pumpfun_progress};
use crate::decode::pumpfun::decode_trade_event;
use crate::decode::types::{NormalizedRecord, PoolStateUpdate, TradeMetadata, TradeRecord};
use crate::feed::{SubscriptionFilter, Update};
use crate::store::TradeType;

use crate::decode::constants::{DEFAULT_TOKEN_DECIMALS, SOL_DECIMALS};

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_transaction_accounts([PUMPFUN_PROGRAM.to_string()])
}

pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Transaction(tx) = update else { return Vec::new() };
    if tx.err {
        return Vec::new();
    }

    let Some(bonding_curve) = tx
        .account_keys
        .iter()
        .find(|key| key.as_str() != PUMPFUN_PROGRAM)
        .cloned()
    else {
        return Vec::new();
    };

    extract_program_data(&tx.log_messages)
        .into_iter()
        .filter_map(|payload| decode_trade_event(&payload).ok())
        .flat_map(|event| {
            let block_time = tx
                .block_time
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .unwrap_or_else(Utc::now);

            let trade = NormalizedRecord::TradeRecord(TradeRecord {
                mint: event.mint.to_string(),
                pool_address: bonding_curve.clone(),
                signature: tx.signature.clone(),
                slot: tx.slot,
                block_time,
                kind: if event.is_buy { TradeType::Buy } else { TradeType::Sell },
                user: event.user.to_string(),
                sol_amount: event.sol_amount,
                token_amount: event.token_amount,
                pre_base_reserves: 0,
                pre_quote_reserves: 0,
                post_base_reserves: event.virtual_token_reserves,
                post_quote_reserves: event.virtual_sol_reserves,
                metadata: TradeMetadata { success: true, ..Default::default() },
            });

            let pool_update = NormalizedRecord::PoolStateUpdate(PoolStateUpdate {
                pool_address: bonding_curve.clone(),
                virtual_base_reserves: Some(event.virtual_token_reserves),
                virtual_quote_reserves: Some(event.virtual_sol_reserves),
                real_base_reserves: Some(event.real_token_reserves),
                real_quote_reserves: Some(event.real_sol_reserves),
                bonding_curve_progress: Some(pumpfun_progress(event.virtual_token_reserves)),
                latest_price: price_from_reserves(
                    event.virtual_token_reserves,
                    event.virtual_sol_reserves,
                    DEFAULT_TOKEN_DECIMALS,
                    SOL_DECIMALS,
                ),
            });

            vec![trade, pool_update]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TransactionUpdate;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use solana_sdk::pubkey::Pubkey;

    fn event_log() -> String {
        let event = crate::decode::pumpfun::TradeEvent {
            mint: Pubkey::new_unique(),
            sol_amount: 1_500_000_000,
            token_amount: 200_000_000_000,
            is_buy: true,
            user: Pubkey::new_unique(),
            timestamp: 1_700_000_000,
            virtual_sol_reserves: 32_000_000_000,
            virtual_token_reserves: 850_000_000_000_000,
            real_sol_reserves: 27_000_000_000,
            real_token_reserves: 750_000_000_000_000,
        };
        let mut payload = vec![0u8; 8];
        payload.extend(borsh::to_vec(&event).unwrap());
        format!("Program data: {}", STANDARD.encode(payload))
    }

    #[test]
    fn emits_trade_and_pool_state_update() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: Some(1_700_000_000),
            is_vote: false,
            err: false,
            account_keys: vec!["CURVE1".to_string(), PUMPFUN_PROGRAM.to_string()],
            log_messages: vec![event_log()],
        });
        let records = decode(update);
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], NormalizedRecord::TradeRecord(_)));
        let NormalizedRecord::PoolStateUpdate(update) = &records[1] else { panic!("expected pool update") };
        assert!(update.bonding_curve_progress.unwrap() > 0.0);
    }
}
