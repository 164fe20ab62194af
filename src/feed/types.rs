//! Update types the feed pool hands to consumers (spec §4.2). Opaque
//! producers per spec §1's Non-goals: account/transaction byte layouts are
//! not interpreted here, only carried.

#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub pubkey: String,
    pub owner: String,
    pub lamports: u64,
    pub data: Vec<u8>,
    pub slot: u64,
}

#[derive(Debug, Clone)]
pub struct TransactionUpdate {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub is_vote: bool,
    pub err: bool,
    /// Raw account keys in message order, flat — no per-account role
    /// metadata (spec §4.3.1's role-tagged extraction tier has nothing to
    /// scan against this type; see `decode::graduation`'s module doc).
    pub account_keys: Vec<String>,
    pub log_messages: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Update {
    Account(AccountUpdate),
    Transaction(TransactionUpdate),
}

/// Composite filter over account-ownership, transaction-include, and
/// memcmp filters (spec §4.2); built by each consumer for its venue.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub account_owners: Vec<String>,
    pub account_memcmp: Vec<(usize, Vec<u8>)>,
    pub transaction_account_include: Vec<String>,
}

impl SubscriptionFilter {
    pub fn by_owner(owner: impl Into<String>) -> Self {
        Self { account_owners: vec![owner.into()], ..Default::default() }
    }

    pub fn by_transaction_accounts(accounts: impl IntoIterator<Item = String>) -> Self {
        Self { transaction_account_include: accounts.into_iter().collect(), ..Default::default() }
    }
}
