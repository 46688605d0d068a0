//! Two-phase shutdown driven by SIGTERM and SIGINT
//!
//! - First signal: start draining, schedule a forced exit after the grace period
//! - Second signal: exit immediately
//!
//! In-flight requests are not awaited. The grace period only gives the
//! orchestrator time to stop routing traffic here.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::draining::{DrainState, SignalOutcome};

/// Terminates the process
///
/// Production uses [`ProcessExit`]; tests record the requested code instead.
pub trait Exit: Send + Sync + 'static {
    fn exit(&self, code: i32);
}

/// Exits through `std::process::exit`
pub struct ProcessExit;

impl Exit for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Drive the shutdown state machine from a stream of signal names
///
/// The forced exit scheduled on the first signal cannot be cancelled; it
/// fires even if the server has already stopped. Returns after requesting
/// an immediate exit, or when the signal stream ends.
pub async fn handle_signals<S, E>(
    mut signals: S,
    drain: DrainState,
    grace: Duration,
    exit: Arc<E>,
) where
    S: Stream<Item = &'static str> + Unpin,
    E: Exit,
{
    while let Some(signal) = signals.next().await {
        match drain.on_signal() {
            SignalOutcome::BeginDrain => {
                info!(
                    signal = signal,
                    grace_secs = grace.as_secs(),
                    "Draining, forced exit scheduled"
                );
                let exit = Arc::clone(&exit);
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    info!("Grace period elapsed, exiting");
                    exit.exit(0);
                });
            }
            SignalOutcome::ExitNow => {
                info!(signal = signal, "Received signal while draining, exiting now");
                exit.exit(0);
                return;
            }
        }
    }
    warn!("Signal stream ended");
}

/// Stream of SIGTERM and SIGINT deliveries
///
/// Yields the signal name for every delivery, indefinitely.
///
/// # Errors
/// Returns an error if the signal handlers cannot be registered.
#[cfg(unix)]
pub fn signal_stream() -> std::io::Result<impl Stream<Item = &'static str> + Unpin> {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate())?;
    let sigint = signal(SignalKind::interrupt())?;

    let stream = futures::stream::unfold((sigterm, sigint), |(mut sigterm, mut sigint)| async move {
        let name = tokio::select! {
            received = sigterm.recv() => received.map(|_| "SIGTERM"),
            received = sigint.recv() => received.map(|_| "SIGINT"),
        };
        name.map(|name| (name, (sigterm, sigint)))
    });
    Ok(Box::pin(stream))
}

/// Stream of Ctrl+C deliveries (non-Unix)
///
/// # Errors
/// Never fails at registration; a failed wait ends the stream.
#[cfg(not(unix))]
pub fn signal_stream() -> std::io::Result<impl Stream<Item = &'static str> + Unpin> {
    let stream = futures::stream::unfold((), |()| async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(("CTRL_C", ())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to wait for Ctrl+C");
                None
            }
        }
    });
    Ok(Box::pin(stream))
}
