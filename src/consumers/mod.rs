//! Consumer catalogue (spec §4.3): eight supervised workers, one per
//! venue-specific subscription, each emitting `NormalizedRecord`s to the
//! shared `Reconciler`.

pub mod common;
pub mod graduation_detector;
pub mod launchpad_account;
pub mod launchpad_transactions;
pub mod mint_detector;
pub mod pumpfun_bonding_curve;
pub mod pumpfun_trade;
pub mod pumpswap;

use std::sync::Arc;

use crate::feed::FeedClient;
use crate::reconciler::Reconciler;
use crate::rpc::ChainRpcClient;
use crate::shutdown::Shutdown;

use common::spawn_consumer;

/// Spawns all eight consumers and returns their join handles; the caller
/// (main) awaits them after shutdown so the binary doesn't exit until every
/// consumer has honored its 1s cancellation budget (spec §4.3.2).
pub fn spawn_all(
    feed: FeedClient,
    reconciler: Arc<Reconciler>,
    chain_rpc: Arc<ChainRpcClient>,
    shutdown: Arc<Shutdown>,
) -> Vec<tokio::task::JoinHandle<()>> {
    vec![
        spawn_consumer(
            "mint_detector",
            feed.clone(),
            mint_detector::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(mint_detector::decode(update)),
        ),
        spawn_consumer(
            "launchpad_transactions",
            feed.clone(),
            launchpad_transactions::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(launchpad_transactions::decode(update)),
        ),
        spawn_consumer(
            "pumpfun_trade",
            feed.clone(),
            pumpfun_trade::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(pumpfun_trade::decode(update)),
        ),
        spawn_consumer(
            "pumpfun_bonding_curve",
            feed.clone(),
            pumpfun_bonding_curve::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(pumpfun_bonding_curve::decode(update)),
        ),
        spawn_consumer(
            "graduation_detector",
            feed.clone(),
            graduation_detector::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(graduation_detector::decode(update)),
        ),
        spawn_consumer(
            "pumpswap",
            feed.clone(),
            pumpswap::filter(),
            shutdown.clone(),
            reconciler.clone(),
            |update| std::future::ready(pumpswap::decode(update)),
        ),
        {
            let rpc = chain_rpc.clone();
            spawn_consumer(
                "launchpad_account",
                feed.clone(),
                launchpad_account::filter(),
                shutdown.clone(),
                reconciler.clone(),
                move |update| {
                    let rpc = rpc.clone();
                    async move { launchpad_account::decode(update, &rpc).await }
                },
            )
        },
    ]
}
