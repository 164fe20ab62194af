//! GraduationDetector (spec §4.3 item 6): watches the migration program's
//! transactions and resolves which AMM a bonding curve graduated into from
//! the log line the migration program emits naming its target.

use crate::decode::constants::MIGRATION_PROGRAM;
use crate::decode::graduation::extract_mint;
use crate::decode::types::{Graduated, NormalizedRecord, TargetAmm};
use crate::feed::{SubscriptionFilter, Update};

pub fn filter() -> SubscriptionFilter {
    SubscriptionFilter::by_transaction_accounts([MIGRATION_PROGRAM.to_string()])
}

fn target_amm_from_logs(log_messages: &[String]) -> Option<TargetAmm> {
    log_messages.iter().find_map(|line| {
        let lower = line.to_lowercase();
        if lower.contains("raydium") {
            Some(TargetAmm::Raydium)
        } else if lower.contains("pumpswap") {
            Some(TargetAmm::PumpSwap)
        } else if lower.contains("pumpfun") {
            Some(TargetAmm::PumpFun)
        } else {
            None
        }
    })
}

pub fn decode(update: Update) -> Vec<NormalizedRecord> {
    let Update::Transaction(tx) = update else { return Vec::new() };
    if tx.err {
        return Vec::new();
    }

    let Some(target_amm) = target_amm_from_logs(&tx.log_messages) else { return Vec::new() };
    let Some(mint) = extract_mint(&tx.account_keys) else { return Vec::new() };

    vec![NormalizedRecord::Graduated(Graduated { mint, target_amm, graduation_sig: tx.signature })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TransactionUpdate;

    #[test]
    fn resolves_target_amm_from_logs() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: None,
            is_vote: false,
            err: false,
            account_keys: vec!["11111111111111111111111111111111111111111".to_string(), "MINT1".to_string()],
            log_messages: vec!["Program log: migrating to raydium".to_string()],
        });
        let records = decode(update);
        assert_eq!(records.len(), 1);
        let NormalizedRecord::Graduated(g) = &records[0] else { panic!("expected graduated") };
        assert_eq!(g.target_amm, TargetAmm::Raydium);
        assert_eq!(g.mint, "MINT1");
    }

    #[test]
    fn no_target_log_yields_nothing() {
        let update = Update::Transaction(TransactionUpdate {
            signature: "SIG1".to_string(),
            slot: 1,
            block_time: None,
            is_vote: false,
            err: false,
            account_keys: vec!["MINT1".to_string()],
            log_messages: vec!["Program log: unrelated".to_string()],
        });
        assert!(decode(update).is_empty());
    }
}
