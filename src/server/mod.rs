// Server module entry
// Listener creation, the accept loop and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;
use connection::accept_connection;

pub use listener::create_reusable_listener;
pub use signal::start_signal_handler;

/// How long in-flight connections may run after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between checks of the active connection count while draining
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until the shutdown signal fires, then drain.
///
/// Must run inside a `LocalSet`, connections are served with `spawn_local`.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) -> Result<(), Box<dyn std::error::Error>> {
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

            () = state.shutdown_signal.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections, DRAIN_TIMEOUT).await;
    Ok(())
}

/// Wait until no connection is active or `timeout` has elapsed
async fn drain_connections(active_connections: &AtomicUsize, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;

    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Drain timeout, closing with {} active connections",
                active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_info("All connections closed");
}
