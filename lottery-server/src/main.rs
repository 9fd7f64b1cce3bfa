//! Lottery Server
//!
//! Runs scheduled lottery draws and exposes the admin and participant APIs.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use lottery_core::events::announcement_channel;
use lottery_core::framework::EventLocks;
use lottery_core::notifier::ChannelNotifier;
use lottery_core::processors::{AnnouncementDispatcher, BidLedger, EventScheduler};
use lottery_core::store::{EventStore, JsonFileEventStore};
use server::{build_router, run_server};
use shutdown::spawn_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Lottery Server - scheduled draws over a JSON event store
#[derive(Parser, Debug)]
#[command(name = "lottery-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./lottery-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting lottery-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let listen_addr = config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Open the event store
    let store: Arc<dyn EventStore> = Arc::new(
        JsonFileEventStore::open(&config.store.path)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open event store: {}", e);
                e
            })?,
    );

    // Wire processors
    let locks = EventLocks::new();
    let (announcement_tx, announcement_rx) = announcement_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = EventScheduler::new(
        store.clone(),
        Arc::new(ChannelNotifier::new(announcement_tx)),
        locks.clone(),
    );
    let ledger = BidLedger::new(store.clone(), locks.clone());
    let dispatcher = AnnouncementDispatcher::new(
        store.clone(),
        config.notifier.webhook_url.clone(),
        config.notifier.timeout(),
    );
    let dispatcher_handle = tokio::spawn(dispatcher.run(shutdown_rx, announcement_rx));

    // Rebuild timers from persisted events
    let armed = scheduler.reconcile_all().await?;
    tracing::info!(armed, "Schedule restored");

    // Create application state
    let state = AppState::new(store, scheduler.clone(), ledger, locks);

    // Spawn reload handler (listens for SIGHUP)
    let reload_notify = spawn_reload_handler(state.clone());

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background work
    reload_notify.notify_one();
    scheduler.shutdown();
    let _ = shutdown_tx.send(true);
    let _ = dispatcher_handle.await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
