//! Mint extraction from migration/graduation transactions (spec §4.3.1):
//! the first non-system account in the message.
//!
//! spec §4.3.1 describes a role-tagged tier ahead of this fallback
//! ("scan parsed instruction accounts by role, fall back to position"), but
//! `feed::types::TransactionUpdate.account_keys` is a flat `Vec<String>`
//! with no per-account role attached — this feed carries no instruction-level
//! metadata at all, only the message's flat key list and its log lines. A
//! role-tagged tier has nothing to scan here; resolving one would mean
//! teaching the feed to decode each instruction's account layout per
//! program, which is feed-layer work, not a decode-layer fix. Tracked as a
//! fidelity gap in `DESIGN.md` rather than simulated with a tier that can
//! never fire.

const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111111111111";

/// `account_keys` is the transaction's flat account-key list, in message
/// order. Returns the first key that isn't the system program.
pub fn extract_mint(account_keys: &[String]) -> Option<String> {
    account_keys.iter().find(|&key| key != SYSTEM_PROGRAM).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_the_system_program_account() {
        let accounts = vec![SYSTEM_PROGRAM.to_string(), "MINT1".to_string()];
        assert_eq!(extract_mint(&accounts), Some("MINT1".to_string()));
    }

    #[test]
    fn first_account_wins_when_no_system_program_present() {
        let accounts = vec!["MINT1".to_string(), "MINT2".to_string()];
        assert_eq!(extract_mint(&accounts), Some("MINT1".to_string()));
    }

    #[test]
    fn empty_accounts_yield_none() {
        assert_eq!(extract_mint(&[]), None);
    }
}
