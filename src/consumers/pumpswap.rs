//! PumpSwapPoolCreation / Trade / Price (spec §4.3 item 7): once a token
//! graduates into PumpSwap, this consumer picks up the new pool, its
//! trades, and the price updates those trades imply.

use chrono::{TimeZone, Utc};

use crate::decode::constants::{PUMPSWAP_PROGRAM, WRAPPED_SOL_MINT};
use crate::decode::events::extract_program_data;
use crate::decode::pumpfun::decode_trade_event;
use crate::decode::pumpswap::{pool_created, price_update};
use crate::decode::types::{NormalizedRecord, TradeMetadata, TradeRecord};
use crate::feed::{SubscriptionFilter, Update};
use crate::store::TradeType;

const CREATE_POOL_LOG_MARKER: &str = "Instruction: CreatePool";

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_transaction_accounts([PUMPSWAP_PROGRAM.to_string()])
}

pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Transaction(tx) = update else { return Vec::new() };
    if tx.err {
        return Vec::new();
    }

    let Some(pool_address) = tx
        .account_keys
        .iter()
        .find(|key| key.as_str() != PUMPSWAP_PROGRAM)
        .cloned()
    else {
        return Vec::new();
    };

    if tx.log_messages.iter().any(|l| l.contains(CREATE_POOL_LOG_MARKER)) {
        let Some(base_mint) = tx.account_keys.get(1).cloned() else { return Vec::new() };
        return vec![NormalizedRecord::PoolCreated(pool_created(&pool_address, &base_mint, WRAPPED_SOL_MINT))];
    }

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
                pool_address: pool_address.clone(),
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
            let price = NormalizedRecord::PriceUpdate(price_update(
                &pool_address,
                event.virtual_token_reserves,
                event.virtual_sol_reserves,
                crate::decode::constants::DEFAULT_TOKEN_DECIMALS,
            ));
            vec![trade, price]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TransactionUpdate;

    #[test]
    fn emits_pool_created_on_create_pool_instruction() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: None,
            is_vote: false,
            err: false,
            account_keys: vec!["POOL1".to_string(), "MINT1".to_string(), PUMPSWAP_PROGRAM.to_string()],
            log_messages: vec!["Program log: Instruction: CreatePool".to_string()],
        });
        let records = decode(update);
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], NormalizedRecord::PoolCreated(_)));
    }
}
