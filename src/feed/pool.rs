//! Process-wide pool of block-subscription connections (spec §4.2). Each
//! logical stream is identified by a caller-chosen `subscriptionId`; the
//! pool guarantees at most one active stream per id and owns the wire-level
//! reconnect loop so consumers only ever see a lazy `Update` sequence.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::config::{BackoffConfig, FeedConfig};
use crate::feed::connection::run_subscription;
use crate::feed::types::{SubscriptionFilter, Update};
use crate::logger::{self, LogTag};
use crate::shutdown::Shutdown;

const STREAM_BUFFER: usize = 256;

pub struct Stream {
    subscription_id: String,
    rx: mpsc::Receiver<Update>,
    pool: Arc<FeedClientInner>,
}

impl Stream {
    /// Lazy, infinite sequence of updates; `None` only once the pool or the
    /// owning subscription has been closed.
    pub async fn recv(&mut self) -> Option<Update> {
        self.rx.recv().await
    }

    pub async fn close(self) {
        self.pool.release(&self.subscription_id).await;
    }
}

struct FeedClientInner {
    config: FeedConfig,
    backoff: BackoffConfig,
    shutdown: Arc<Shutdown>,
    active: Mutex<HashMap<String, tokio::task::JoinHandle<()>>>,
}

/// Handle shared by every consumer; cheap to clone (wraps an `Arc`).
#[derive(Clone)]
pub struct FeedClient {
    inner: Arc<FeedClientInner>,
}

impl FeedClient {
    pub fn new(config: FeedConfig, backoff: BackoffConfig, shutdown: Arc<Shutdown>) -> Self {
        Self {
            inner: Arc::new(FeedClientInner {
                config,
                backoff,
                shutdown,
                active: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Opens (or reuses) the subscription for `subscription_id` and returns
    /// a lazy stream of matching updates. Spawns the connection/reconnect
    /// task on first acquire; subsequent acquires for the same id would be
    /// a caller bug (spec §4.2: "at most one active stream per id").
    pub async fn acquire(&self, subscription_id: &str, filter: SubscriptionFilter) -> Stream {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let inner = self.inner.clone();
        let id = subscription_id.to_string();

        let handle = tokio::spawn(run_subscription(
            inner.config.clone(),
            inner.backoff,
            inner.shutdown.clone(),
            id.clone(),
            filter,
            tx,
        ));

        self.inner.active.lock().await.insert(id.clone(), handle);
        logger::info(LogTag::Feed, &format!("acquired subscription {id}"));
        Stream { subscription_id: id, rx, pool: self.inner.clone() }
    }

    /// Closes the pool: aborts every live subscription task. Called from the
    /// shutdown sequence's "close feed pool" phase.
    pub async fn close_all(&self) {
        let mut active = self.inner.active.lock().await;
        for (id, handle) in active.drain() {
            handle.abort();
            logger::debug(LogTag::Feed, &format!("aborted subscription {id} on pool close"));
        }
    }
}

impl FeedClientInner {
    async fn release(&self, subscription_id: &str) {
        if let Some(handle) = self.active.lock().await.remove(subscription_id) {
            handle.abort();
            logger::info(LogTag::Feed, &format!("released subscription {subscription_id}"));
        }
    }
}
