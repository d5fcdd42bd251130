//! Aegis Outbox Relay
//!
//! Polls `transaction_outbox` for pending rows and republishes them to the event log (§4.3).
//! Safe to run with multiple replicas: `FOR UPDATE SKIP LOCKED` gives each row to exactly one
//! replica per tick.
//!
//! # Usage
//!
//! ```bash
//! aegis-outbox-relay
//! aegis-outbox-relay --config /path/to/config.toml
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aegis_config::{AegisConfig, LoggingConfig, MetricsConfig};
use aegis_db::Database;
use aegis_eventlog::Producer;
use aegis_ledger::Relay;

#[derive(Parser, Debug)]
#[command(name = "aegis-outbox-relay")]
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

    init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting aegis-outbox-relay");

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let producer = Producer::connect(&config.event_log).await?;

    let relay = Relay::new(
        db,
        producer,
        config.event_log.relay_batch_size,
        Duration::from_secs(config.event_log.relay_poll_interval_secs),
    );

    if config.metrics.enabled {
        start_metrics_server(&config.metrics)?;
    }

    let cancel = CancellationToken::new();
    let relay_cancel = cancel.clone();
    let relay_task = tokio::spawn(async move { relay.run(relay_cancel).await });

    shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping relay");
    cancel.cancel();

    let _ = relay_task.await;
    tracing::info!("aegis-outbox-relay shutdown complete");

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
