//! Taskwatch compliance engine - main entry point.
//!
//! Default mode runs one compliance pass to completion and exits 0 on
//! success, 1 on a fatal failure. `--serve` hosts the HTTP trigger instead.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taskwatch_engine::auth::SharedSecretAuth;
use taskwatch_engine::config::AppConfig;
use taskwatch_engine::engine::ComplianceEngine;
use taskwatch_engine::progress::TracingSink;
use taskwatch_engine::store::FileStore;
use taskwatch_engine::timeutil::SystemClock;
use taskwatch_engine::trigger::{self, TriggerState};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "taskwatch-engine")]
#[command(about = "Taskwatch - Recurring Task Compliance Engine")]
#[command(version)]
struct Args {
    /// Path to the JSON document store file.
    #[arg(long, env = "TASKWATCH_STORE", default_value = "taskwatch-store.json")]
    store_path: String,

    /// Log level.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Host the HTTP trigger instead of running once.
    #[arg(long)]
    serve: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    tracing::info!(
        "Starting taskwatch compliance engine v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded");

    let store = Arc::new(FileStore::open(&args.store_path).await?);
    let auth = Arc::new(SharedSecretAuth::new(
        config.auth.service_credential.clone(),
        config.auth.subject.clone(),
    ));
    let engine = Arc::new(ComplianceEngine::new(
        store,
        auth,
        Arc::new(SystemClock),
        Arc::new(TracingSink),
        config.engine,
    ));

    if args.serve {
        let app = trigger::router(TriggerState {
            engine,
            shared_secret: config.trigger.shared_secret.clone(),
        });
        let addr = format!("{}:{}", config.trigger.host, config.trigger.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Trigger listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Trigger shut down gracefully");
        return Ok(());
    }

    let summary = engine.run().await?;
    tracing::info!(
        tenants = summary.tenants_processed,
        missed = summary.missed_recorded,
        "Compliance run finished"
    );
    Ok(())
}

/// Initialize tracing/logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
