//! Run command: bootstrap the session and log normalized messages until stopped.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::bootstrap::SessionBootstrap;
use crate::bridge::BridgeClient;
use crate::config::Config;
use crate::output::{self, OutputControls};
use crate::pipeline::{MessageHandler, Normalizer};
use crate::render::TerminalRenderer;
use crate::store::SqliteStore;
use crate::transport::Transport;

/// Start, pair or resume, then process events until Ctrl+C / SIGTERM.
pub async fn run(config: &Config, output: &OutputControls) -> Result<()> {
    let store = Arc::new(
        SqliteStore::open(&config.db_path).context("Failed to open session store")?,
    );
    let bridge = Arc::new(BridgeClient::new(&config.socket_path, store.clone()));

    let handler = Arc::new(MessageHandler::new(
        Normalizer::new(store.clone(), store.clone()),
        output::event_sink(output),
    ));
    let handler_id = bridge.add_event_handler(handler.into_event_handler());
    debug!(handler = ?handler_id, "message handler registered");

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        stop.cancel();
    });

    let mut bootstrap =
        SessionBootstrap::new(store.clone(), bridge.clone(), Arc::new(TerminalRenderer));
    let session = bootstrap
        .run(&cancel)
        .await
        .with_context(|| format!("Failed to start session via {:?}", bridge.socket_path()))?;

    match session.device() {
        Some(device) => info!(device = %device.id, "listening for messages"),
        None => info!("listening for messages (device not paired)"),
    }

    cancel.cancelled().await;
    session.disconnect().await;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
