// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the ping endpoint.
///
/// Returns once `shutdown` is notified and every active connection has
/// finished, or the drain deadline (`write_timeout`) has passed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                break;
            }
        }
    }

    // Stop accepting before draining
    drop(listener);

    let deadline = Duration::from_secs(state.config.performance.write_timeout);
    let remaining = drain_connections(&active_connections, deadline).await;
    logger::log_drained(remaining);
}

/// Wait for the counter to reach zero, up to `deadline`. Returns what is left.
async fn drain_connections(active_connections: &AtomicUsize, deadline: Duration) -> usize {
    let wait = async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    };
    let _ = tokio::time::timeout(deadline, wait).await;
    active_connections.load(Ordering::SeqCst)
}
