//! MintDetector (spec §4.3 item 1): watches RaydiumLaunchpad `initialize`
//! instructions and emits the token's and pool's creation records.

use chrono::Utc;

use crate::decode::constants::RAYDIUM_LAUNCHPAD_PROGRAM;
use crate::decode::types::{NormalizedRecord, PoolCreated, TokenCreated};
use crate::feed::{SubscriptionFilter, Update};
use crate::store::Venue;

const INITIALIZE_LOG_MARKER: &str = "Instruction: Initialize";

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_transaction_accounts([RAYDIUM_LAUNCHPAD_PROGRAM.to_string()])
}

/// `account_keys[0]` is the fee payer/creator in Solana's message-account
/// convention; the mint and pool addresses are the first two non-system,
/// non-program accounts that follow (spec §4.3.1's role-tagged scan falls
/// back to positional scanning when the feed carries no parsed roles).
pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Transaction(tx) = update else { return Vec::new() };
    if tx.err || !tx.log_messages.iter().any(|l| l.contains(INITIALIZE_LOG_MARKER)) {
        return Vec::new();
    }

    let candidates: Vec<&String> = tx
        .account_keys
        .iter()
        .filter(|key| key.as_str() != RAYDIUM_LAUNCHPAD_PROGRAM)
        .collect();
    let (Some(creator), Some(mint), Some(pool)) = (candidates.first(), candidates.get(1), candidates.get(2))
    else {
        return Vec::new();
    };

    vec![
        NormalizedRecord::TokenCreated(TokenCreated {
            mint: (*mint).clone(),
            creator: (*creator).clone(),
            creation_sig: tx.signature.clone(),
            venue: Venue::RaydiumLaunchpad,
        }),
        NormalizedRecord::PoolCreated(PoolCreated {
            pool_address: (*pool).clone(),
            base_mint: (*mint).clone(),
            quote_mint: crate::decode::constants::WRAPPED_SOL_MINT.to_string(),
            venue: Venue::RaydiumLaunchpad,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TransactionUpdate;

    fn sample_tx(log: &str, keys: &[&str]) -> Update {
        Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: Some(Utc::now().timestamp()),
            is_vote: false,
            err: false,
            account_keys: keys.iter().map(|s| s.to_string()).collect(),
            log_messages: vec![log.to_string()],
        })
    }

    #[test]
    fn emits_token_and_pool_on_initialize() {
        let update = sample_tx(
            "Program log: Instruction: Initialize",
            &["CREATOR1", "MINT1", "POOL1", RAYDIUM_LAUNCHPAD_PROGRAM],
        );
        let records = decode(update);
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], NormalizedRecord::TokenCreated(_)));
        assert!(matches!(records[1], NormalizedRecord::PoolCreated(_)));
    }

    #[test]
    fn ignores_unrelated_instructions() {
        let update = sample_tx("Program log: Instruction: Swap", &["A", "B", "C"]);
        assert!(decode(update).is_empty());
    }

    #[test]
    fn ignores_failed_transactions() {
        let mut update = sample_tx("Program log: Instruction: Initialize", &["A", "B", "C"]);
        if let Update::Transaction(tx) = &mut update {
            tx.err = true;
        }
        assert!(decode(update).is_empty());
    }
}
