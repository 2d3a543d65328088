//! Signal server binary entry point
//!
//! Starts the sigrelay REST signaling boundary.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (localhost:8080, ./sigrelay.db)
//! cargo run -p sigrelay-signal-server
//!
//! # Custom bind address and database
//! cargo run -p sigrelay-signal-server -- --bind 0.0.0.0:9090 --database /var/lib/sigrelay/db
//!
//! # From a config file, with logging
//! RUST_LOG=debug cargo run -p sigrelay-signal-server -- --config sigrelay.toml
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sigrelay_core::{RetentionSweeper, SignalingCoordinator, SignalingDb};
use sigrelay_signal_server::api::{self, AppState};
use sigrelay_signal_server::{Metrics, ServerConfig};

/// Sigrelay signal server
///
/// Relays WebRTC offer/answer/candidate exchanges between two peers that
/// rendezvous under a shared secret.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SIGRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address for the REST listener (overrides the config file)
    #[arg(long, env = "SIGRELAY_BIND_ADDRESS")]
    bind: Option<String>,

    /// SQLite database path (overrides the config file)
    #[arg(long, env = "SIGRELAY_DATABASE")]
    database: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.bind_address,
        database = %config.database_path.display(),
        "sigrelay signal server starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("sigrelay-http")
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = SignalingDb::open(&config.database_path)?;
    let coordinator = Arc::new(SignalingCoordinator::new(db.clone()));
    let metrics = Arc::new(Metrics::new());

    let (shutdown_tx, _) = broadcast::channel(1);

    // Background TTL sweep for abandoned sessions
    if config.retention.session_ttl_seconds > 0 {
        let sweeper = Arc::new(RetentionSweeper::new(
            db,
            Duration::from_secs(config.retention.session_ttl_seconds),
        ));
        tokio::spawn(sweeper.run(
            Duration::from_secs(config.retention.sweep_interval_seconds),
            shutdown_tx.subscribe(),
        ));
    } else {
        info!("session retention disabled (session_ttl_seconds = 0)");
    }

    let app = api::router(
        AppState {
            coordinator,
            metrics,
        },
        config.permissive_cors,
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    info!("signal server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C, then fan the shutdown out to background tasks.
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
    let _ = shutdown_tx.send(());
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
