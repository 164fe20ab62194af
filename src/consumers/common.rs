//! Shared consumer skeleton (spec §4.3): `loop: acquire → decode → emit;
//! on error: release and reconnect`. The feed pool already owns the
//! reconnect/backoff loop (`feed::connection::run_subscription`), so this
//! layer only needs to drain the stream and hand decoded records to the
//! Reconciler, stopping within 1s of cancellation (spec §4.3.2).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::decode::types::NormalizedRecord;
use crate::feed::{FeedClient, SubscriptionFilter, Update};
use crate::logger::{self, LogTag};
use crate::reconciler::Reconciler;
use crate::shutdown::Shutdown;

/// Runs one consumer forever until shutdown is cancelled. `decode` maps one
/// raw `Update` to zero or more normalized records (a single transaction can
/// carry both a pool-creation and a trade, for instance); it is async since
/// some consumers (e.g. `launchpad_account`) need an RPC round-trip for vault
/// balances before they can emit.
pub async fn run_consumer<F, Fut>(
    queue: &str,
    feed: &FeedClient,
    filter: SubscriptionFilter,
    shutdown: &Shutdown,
    reconciler: &Reconciler,
    mut decode: F,
) where
    F: FnMut(Update) -> Fut,
    Fut: Future<Output = Vec<NormalizedRecord>>,
{
    let mut stream = feed.acquire(queue, filter).await;
    logger::info(LogTag::Consumer, &format!("{queue} started"));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                break;
            }
            update = stream.recv() => {
                let Some(update) = update else {
                    logger::warning(LogTag::Consumer, &format!("{queue} stream closed"));
                    break;
                };
                for record in decode(update).await {
                    reconciler.handle(queue, record).await;
                }
            }
        }
    }

    tokio::select! {
        _ = stream.close() => {}
        _ = tokio::time::sleep(Duration::from_secs(1)) => {
            logger::warning(LogTag::Consumer, &format!("{queue} close exceeded 1s budget"));
        }
    }
    logger::info(LogTag::Consumer, &format!("{queue} stopped"));
}

pub fn spawn_consumer<F, Fut>(
    queue: &'static str,
    feed: FeedClient,
    filter: SubscriptionFilter,
    shutdown: Arc<Shutdown>,
    reconciler: Arc<Reconciler>,
    decode: F,
) -> tokio::task::JoinHandle<()>
where
    F: FnMut(Update) -> Fut + Send + 'static,
    Fut: Future<Output = Vec<NormalizedRecord>> + Send,
{
    tokio::spawn(async move {
        run_consumer(queue, &feed, filter, &shutdown, &reconciler, decode).await;
    })
}
