//! Aegis Balance Worker
//!
//! Consumes `ledger.entry.created` events from the event log, group `aegis.balance.worker`, and
//! finalizes each settlement by moving funds from `locked_balance` to `balance` once the event
//! that announces them has been durably produced and consumed (§4.6). Deliberately decoupled
//! from the webhook worker's ledger write path so this move never happens before the event that
//! records it.
//!
//! # Usage
//!
//! ```bash
//! aegis-balance-worker
//! aegis-balance-worker --config /path/to/config.toml
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aegis_cache::LockStore;
use aegis_config::{AegisConfig, LoggingConfig, MetricsConfig};
use aegis_db::Database;
use aegis_eventlog::{topics, Consumer, Producer};
use aegis_ledger::BalanceWorker;

#[derive(Parser, Debug)]
#[command(name = "aegis-balance-worker")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "AEGIS_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "AEGIS_LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(long, env = "AEGIS_LOG_FORMAT")]
    log_format: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AegisConfig::load(args.config.as_deref())?;

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if let Some(url) = args.database_url {
        config.database.postgres_url = url;
    }
    if let Some(url) = args.redis_url {
        config.redis.redis_url = url;
    }

    init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting aegis-balance-worker");

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let redis_config = deadpool_redis::Config::from_url(config.redis.redis_url.clone());
    let redis_pool = redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?;
    let locks = LockStore::new(redis_pool, config.redis.lock_key_prefix.clone());

    let worker = BalanceWorker::new(db, locks);

    let consumer = Consumer::connect(
        &config.event_log,
        topics::TOPIC_BALANCE_UPDATE,
        topics::GROUP_BALANCE_WORKER,
    )
    .await?;
    let dlq_producer = Producer::connect(&config.event_log).await?;

    if config.metrics.enabled {
        start_metrics_server(&config.metrics)?;
    }

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_task = tokio::spawn(async move { consumer.run(worker, &dlq_producer, run_cancel).await });

    shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping balance worker");
    cancel.cancel();

    let _ = run_task.await;
    tracing::info!("aegis-balance-worker shutdown complete");

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).init(),
        _ => subscriber.with(fmt::layer().pretty().with_target(true)).init(),
    }

    Ok(())
}

fn start_metrics_server(config: &MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(port = config.port, "starting metrics server");

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()?;

    tokio::spawn(async move {
        let _handle = handle;
        std::future::pending::<()>().await;
    });

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c"),
        _ = terminate => tracing::info!("received sigterm"),
    }
}
