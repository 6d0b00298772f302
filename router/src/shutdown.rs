//! Signal-driven shutdown for the server process.

use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawns a SIGTERM/SIGINT listener and returns the token it trips.
///
/// The token gates the HTTP server's graceful shutdown, so in-flight
/// settlements drain instead of being cut off mid-transfer. Registration
/// happens up front; a registration failure is a startup error.
pub fn termination_token() -> std::io::Result<CancellationToken> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let token = CancellationToken::new();
    let trip = token.clone();
    tokio::spawn(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!(signal = received, "shutdown signal received, draining");
        trip.cancel();
    });
    Ok(token)
}
