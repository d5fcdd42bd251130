//! Aegis Webhook Worker
//!
//! Consumes `webhook.received` events from the event log, group `aegis.webhook.worker`, and
//! performs the double-entry ledger update described in §4.5: per-user lock, a single DB
//! transaction moving funds across the seller/platform/external wallets, and a co-transactional
//! `ledger.entry.created` outbox row that the balance worker depends on.
//!
//! # Usage
//!
//! ```bash
//! aegis-webhook-worker
//! aegis-webhook-worker --config /path/to/config.toml
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aegis_cache::{IdempotencyStore, LockStore};
use aegis_config::{AegisConfig, LoggingConfig, MetricsConfig};
use aegis_db::Database;
use aegis_eventlog::{topics, Consumer, Producer};
use aegis_ledger::WebhookWorker;

#[derive(Parser, Debug)]
#[command(name = "aegis-webhook-worker")]
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

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting aegis-webhook-worker");

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let redis_pool = redis_pool(&config)?;
    let idempotency = IdempotencyStore::new(redis_pool.clone(), config.redis.idempotency_key_prefix.clone());
    let locks = LockStore::new(redis_pool, config.redis.lock_key_prefix.clone());

    let worker = WebhookWorker::new(db, idempotency, locks, config.fee.fee_rate_bps);

    let consumer = Consumer::connect(
        &config.event_log,
        topics::TOPIC_WEBHOOK_PENDING,
        topics::GROUP_WEBHOOK_WORKER,
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
    tracing::info!("shutdown signal received, stopping webhook worker");
    cancel.cancel();

    let _ = run_task.await;
    tracing::info!("aegis-webhook-worker shutdown complete");

    Ok(())
}

fn redis_pool(config: &AegisConfig) -> anyhow::Result<deadpool_redis::Pool> {
    let redis_config = deadpool_redis::Config::from_url(config.redis.redis_url.clone());
    Ok(redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?)
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
