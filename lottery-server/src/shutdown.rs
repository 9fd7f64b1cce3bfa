//! Signal handling for graceful shutdown and store reload.

use crate::state::AppState;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to install signal handlers, waiting for Ctrl+C");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawns a task that listens for SIGHUP, reloads the store from disk and
/// rebuilds every timer.
///
/// Returns a Notify that can be used to signal when shutdown is complete.
pub fn spawn_reload_handler(state: AppState) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading event store");
                    reload(&state).await;
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}

async fn reload(state: &AppState) {
    if let Err(e) = state.store.reload().await {
        tracing::error!("Failed to reload event store: {}", e);
        return;
    }
    match state.scheduler.reconcile_all().await {
        Ok(armed) => tracing::info!(armed, "Event store reloaded and schedule rebuilt"),
        Err(e) => tracing::error!("Failed to rebuild schedule after reload: {}", e),
    }
}
