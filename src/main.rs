use std::sync::Arc;
use std::time::Duration;

use core_pipeline::config;
use core_pipeline::consumers;
use core_pipeline::feed::FeedClient;
use core_pipeline::logger::{self, LogTag};
use core_pipeline::metrics::Counters;
use core_pipeline::reconciler::Reconciler;
use core_pipeline::rpc::RpcStack;
use core_pipeline::score::HolderAnalyzer;
use core_pipeline::shutdown::{self, SHUTDOWN};
use core_pipeline::store::Store;

const RECONCILER_TICK: Duration = Duration::from_millis(500);
const HOLDER_CYCLE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    core_pipeline::arguments::set_cmd_args(std::env::args().collect());
    logger::init();

    if let Err(e) = config::load_config() {
        logger::error(LogTag::Config, &format!("failed to load configuration: {e}"));
        std::process::exit(1);
    }
    if let Err(e) = shutdown::install_shutdown_handlers() {
        logger::error(LogTag::Shutdown, &format!("failed to install shutdown handlers: {e}"));
        std::process::exit(1);
    }

    let store = match config::with_config(|c| Store::open(&c.store.db_url)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            logger::error(LogTag::Store, &format!("failed to open store: {e}"));
            std::process::exit(1);
        }
    };

    let rpc_stack = config::with_config(|c| {
        RpcStack::new(
            c.rpc.url.clone(),
            c.enrich.base_url.clone(),
            c.enrich.api_key.clone(),
            c.rate_limit.per_second,
            c.rate_limit.per_second,
            c.rate_limit.per_minute,
        )
    });
    let chain_rpc = Arc::new(rpc_stack.chain);
    let enrich = Arc::new(rpc_stack.enrich);

    let counters = Arc::new(Counters::new());
    let reconciler = Arc::new(config::with_config(|c| {
        Reconciler::new(store.clone(), c.reconciler.clone(), counters.clone())
    }));

    let feed = config::with_config(|c| FeedClient::new(c.feed.clone(), c.backoff, shutdown::shutdown_handle()));

    let consumer_handles = consumers::spawn_all(
        feed.clone(),
        reconciler.clone(),
        chain_rpc.clone(),
        shutdown::shutdown_handle(),
    );

    let reconciler_tick = reconciler.clone();
    let reconciler_loop = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RECONCILER_TICK);
        loop {
            ticker.tick().await;
            if SHUTDOWN.is_cancelled() {
                break;
            }
            reconciler_tick.flush_due_pool_updates().await;
            reconciler_tick.flush_due_batches().await;
        }
    });

    let holder_analyzer = Arc::new(HolderAnalyzer::new(
        store.clone(),
        enrich.clone(),
        config::with_config(|c| c.holder_budget.clone()),
    ));
    let holder_loop_analyzer = holder_analyzer.clone();
    let holder_loop = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HOLDER_CYCLE_INTERVAL);
        loop {
            ticker.tick().await;
            if SHUTDOWN.is_cancelled() {
                break;
            }
            holder_loop_analyzer.run_cycle().await;
        }
    });

    logger::info(LogTag::System, "pipeline started");
    SHUTDOWN.cancelled().await;

    let reconciler_for_flush = reconciler.clone();
    let feed_for_close = feed.clone();
    shutdown::run_shutdown_sequence(
        async {
            reconciler_loop.abort();
            holder_loop.abort();
            for handle in consumer_handles {
                handle.abort();
            }
        },
        async move {
            reconciler_for_flush.flush_all().await;
        },
        async move {
            feed_for_close.close_all().await;
        },
        async {},
    )
    .await;
}
