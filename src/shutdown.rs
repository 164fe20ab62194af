//! Graceful shutdown coordinator.
//!
//! A top-level cancellation signal must stop all consumers within 1s, flush
//! pending batches best-effort with a 5s budget, close the feed pool, and
//! close store connections. Any in-flight external API call is abandoned
//! (not awaited) on cancel.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use crate::logger::{self, LogTag};

pub const CONSUMER_STOP_BUDGET: Duration = Duration::from_secs(1);
pub const BATCH_FLUSH_BUDGET: Duration = Duration::from_secs(5);

pub static SHUTDOWN: Lazy<Arc<Shutdown>> = Lazy::new(|| Arc::new(Shutdown::new()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    StoppingConsumers,
    FlushingBatches,
    ClosingFeed,
    ClosingStore,
    Done,
}

/// Process-wide cancellation token plus phase tracking, so any worker can
/// check `is_cancelled()` and the orchestrator can report shutdown progress.
pub struct Shutdown {
    cancelled: AtomicBool,
    phase: RwLock<ShutdownPhase>,
    notify: Notify,
}

impl Shutdown {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            phase: RwLock::new(ShutdownPhase::Running),
            notify: Notify::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub async fn phase(&self) -> ShutdownPhase {
        *self.phase.read().await
    }

    async fn set_phase(&self, phase: ShutdownPhase) {
        *self.phase.write().await = phase;
    }

    /// Signal cancellation. Idempotent; safe to call from a signal handler.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    /// Resolves once `cancel()` has been called. Consumers select! on this
    /// alongside their normal suspension points (stream recv, store I/O).
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Runs the phased shutdown sequence against the live pipeline handles.
/// `stop_consumers`, `flush_batches`, `close_feed`, `close_store` are
/// supplied by `main` once the concrete Feed/Store/consumer handles exist.
pub async fn run_shutdown_sequence(
    stop_consumers: impl std::future::Future<Output = ()>,
    flush_batches: impl std::future::Future<Output = ()>,
    close_feed: impl std::future::Future<Output = ()>,
    close_store: impl std::future::Future<Output = ()>,
) {
    SHUTDOWN.cancel();

    SHUTDOWN.set_phase(ShutdownPhase::StoppingConsumers).await;
    logger::info(LogTag::Shutdown, "stopping consumers");
    if tokio::time::timeout(CONSUMER_STOP_BUDGET, stop_consumers).await.is_err() {
        logger::warning(LogTag::Shutdown, "consumer stop exceeded 1s budget, proceeding anyway");
    }

    SHUTDOWN.set_phase(ShutdownPhase::FlushingBatches).await;
    logger::info(LogTag::Shutdown, "flushing pending batches");
    if tokio::time::timeout(BATCH_FLUSH_BUDGET, flush_batches).await.is_err() {
        logger::warning(LogTag::Shutdown, "batch flush exceeded 5s budget, pending batches dropped");
    }

    SHUTDOWN.set_phase(ShutdownPhase::ClosingFeed).await;
    logger::info(LogTag::Shutdown, "closing feed pool");
    close_feed.await;

    SHUTDOWN.set_phase(ShutdownPhase::ClosingStore).await;
    logger::info(LogTag::Shutdown, "closing store connections");
    close_store.await;

    SHUTDOWN.set_phase(ShutdownPhase::Done).await;
    logger::info(LogTag::Shutdown, "shutdown complete");
}

/// Installs Ctrl+C and SIGTERM handlers that call `SHUTDOWN.cancel()`.
pub fn install_shutdown_handlers() -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        logger::info(LogTag::Shutdown, "received ctrl+c, cancelling");
        SHUTDOWN.cancel();
    })?;

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        tokio::spawn(async {
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
            sigterm.recv().await;
            logger::info(LogTag::Shutdown, "received sigterm, cancelling");
            SHUTDOWN.cancel();
        });
    }

    Ok(())
}

pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.is_cancelled()
}

pub fn shutdown_handle() -> Arc<Shutdown> {
    SHUTDOWN.clone()
}

pub type SharedShutdown = Arc<Shutdown>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_idempotent_and_observable() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_cancelled());
        shutdown.cancel();
        shutdown.cancel();
        assert!(shutdown.is_cancelled());
        shutdown.cancelled().await;
    }
}
