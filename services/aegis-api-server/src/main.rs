//! Aegis API Server
//!
//! The HTTP surface of the settlement pipeline: the idempotent payment-intent handler and the
//! PSP webhook ingester (§4.4, §4.8). Does not perform any ledger mutation itself — that happens
//! downstream in the outbox relay and the webhook/balance workers.
//!
//! # Usage
//!
//! ```bash
//! aegis-api-server
//! aegis-api-server --config /path/to/config.toml
//! AEGIS__SERVER__PORT=8080 aegis-api-server
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aegis_api::state::AppState;
use aegis_cache::IdempotencyStore;
use aegis_config::{AegisConfig, LoggingConfig, MetricsConfig};
use aegis_db::Database;
use aegis_psp::PaystackClient;

#[derive(Parser, Debug)]
#[command(name = "aegis-api-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "AEGIS_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "AEGIS_HOST")]
    host: Option<String>,

    #[arg(short, long, env = "AEGIS_PORT")]
    port: Option<u16>,

    #[arg(long, env = "AEGIS_LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(long, env = "AEGIS_LOG_FORMAT")]
    log_format: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    #[arg(long, env = "PSP_SECRET_KEY")]
    psp_secret_key: Option<String>,

    #[arg(long, env = "PSP_WEBHOOK_SECRET")]
    psp_webhook_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AegisConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
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
    if let Some(key) = args.psp_secret_key {
        config.psp.psp_secret_key = key;
    }
    if let Some(secret) = args.psp_webhook_secret {
        config.psp.psp_webhook_secret = secret;
    }

    init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting aegis-api-server");

    let db = init_database(&config).await?;
    let idempotency = init_idempotency_store(&config).await?;
    let psp = Arc::new(PaystackClient::new(&config.psp.psp_secret_key, &config.psp.psp_base_url)?);

    let config = Arc::new(config);
    let state = Arc::new(AppState::new(db, idempotency, psp, config.clone()));

    let app = aegis_api::create_router(state);

    if config.metrics.enabled {
        start_metrics_server(&config.metrics)?;
    }

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout()))
        .await?;

    tracing::info!("server shutdown complete");

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

async fn init_database(config: &AegisConfig) -> anyhow::Result<Arc<Database>> {
    let db = Database::connect(&config.database).await?;

    if config.database.run_migrations {
        db.migrate().await?;
        db.wallet_repo().ensure_system_wallets("USD").await?;
    }

    Ok(Arc::new(db))
}

async fn init_idempotency_store(config: &AegisConfig) -> anyhow::Result<Arc<IdempotencyStore>> {
    let redis_config = deadpool_redis::Config::from_url(config.redis.redis_url.clone());
    let pool = redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1))?;

    Ok(Arc::new(IdempotencyStore::new(
        pool,
        config.redis.idempotency_key_prefix.clone(),
    )))
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

async fn shutdown_signal(timeout: Duration) {
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
        _ = ctrl_c => tracing::info!("received ctrl-c, initiating graceful shutdown"),
        _ = terminate => tracing::info!("received sigterm, initiating graceful shutdown"),
    }

    tracing::info!(timeout_secs = timeout.as_secs(), "waiting for in-flight requests to complete");
    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parsing_overrides_port() {
        let args = Args::parse_from(["aegis-api-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }
}
