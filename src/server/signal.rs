// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown (sent by container platforms before eviction)
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Resolve with the name of the first shutdown signal received
#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

/// Spawn a background task that notifies `shutdown` on SIGTERM/SIGINT
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                logger::log_shutdown(name);
                shutdown.notify_one();
            }
            Err(e) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
            }
        }
    });
}
