//! Wire-level connection and reconnect loop for one logical subscription.
//! Reconnects with capped exponential backoff (spec §4.2: initial 1s, ≤30s
//! cap, jitter) and reports the transport error once per attempt; the
//! backoff schedule itself lives in `config::BackoffConfig`.

use std::collections::HashMap;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use yellowstone_grpc_client::GeyserGrpcClient;
use yellowstone_grpc_proto::geyser::{
    subscribe_update::UpdateOneof, SubscribeRequest, SubscribeRequestFilterAccounts,
    SubscribeRequestFilterTransactions,
};

use crate::config::{BackoffConfig, FeedConfig};
use crate::feed::types::{AccountUpdate, SubscriptionFilter, TransactionUpdate, Update};
use crate::logger::{self, LogTag};
use crate::shutdown::Shutdown;

fn build_request(filter: &SubscriptionFilter) -> SubscribeRequest {
    let mut accounts = HashMap::new();
    if !filter.account_owners.is_empty() {
        accounts.insert(
            "accounts".to_string(),
            SubscribeRequestFilterAccounts {
                owner: filter.account_owners.clone(),
                ..Default::default()
            },
        );
    }

    let mut transactions = HashMap::new();
    if !filter.transaction_account_include.is_empty() {
        transactions.insert(
            "transactions".to_string(),
            SubscribeRequestFilterTransactions {
                account_include: filter.transaction_account_include.clone(),
                vote: Some(false),
                failed: Some(false),
                ..Default::default()
            },
        );
    }

    SubscribeRequest { accounts, transactions, ..Default::default() }
}

async fn connect_and_stream(
    config: &FeedConfig,
    filter: &SubscriptionFilter,
    tx: &mpsc::Sender<Update>,
    shutdown: &Shutdown,
) -> anyhow::Result<()> {
    let mut client = GeyserGrpcClient::build_from_shared(config.url.clone())?
        .x_token(Some(config.token.clone()))?
        .connect()
        .await?;

    let request = build_request(filter);
    let (_subscribe_tx, mut stream) = client.subscribe_with_request(Some(request)).await?;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            next = stream.next() => {
                let Some(message) = next else { return Ok(()) };
                let update = message?;
                let Some(oneof) = update.update_oneof else { continue };
                let mapped = match oneof {
                    UpdateOneof::Account(account) => account.account.map(|info| {
                        Update::Account(AccountUpdate {
                            pubkey: bs58::encode(&info.pubkey).into_string(),
                            owner: bs58::encode(&info.owner).into_string(),
                            lamports: info.lamports,
                            data: info.data,
                            slot: account.slot,
                        })
                    }),
                    UpdateOneof::Transaction(tx_update) => tx_update.transaction.map(|info| {
                        Update::Transaction(TransactionUpdate {
                            signature: bs58::encode(&info.signature).into_string(),
                            slot: tx_update.slot,
                            block_time: None,
                            is_vote: info.is_vote,
                            err: info
                                .meta
                                .as_ref()
                                .map(|m| m.err.is_some())
                                .unwrap_or(false),
                            account_keys: Vec::new(),
                            log_messages: info
                                .meta
                                .map(|m| m.log_messages)
                                .unwrap_or_default(),
                        })
                    }),
                    _ => None,
                };
                if let Some(update) = mapped {
                    if tx.send(update).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Runs forever (until cancelled or the channel closes): connect, stream,
/// and on any transport error back off and retry. Spawned once per
/// `FeedClient::acquire` call.
pub async fn run_subscription(
    config: FeedConfig,
    backoff: BackoffConfig,
    shutdown: std::sync::Arc<Shutdown>,
    subscription_id: String,
    filter: SubscriptionFilter,
    tx: mpsc::Sender<Update>,
) {
    let mut attempt: u32 = 0;
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        match connect_and_stream(&config, &filter, &tx, &shutdown).await {
            Ok(()) => {
                if shutdown.is_cancelled() || tx.is_closed() {
                    return;
                }
                logger::warning(LogTag::Feed, &format!("{subscription_id} stream ended, reconnecting"));
            }
            Err(e) => {
                logger::warning(LogTag::Feed, &format!("{subscription_id} transport error: {e}"));
            }
        }

        let delay = backoff.delay_for_attempt(attempt);
        attempt = attempt.saturating_add(1);
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
