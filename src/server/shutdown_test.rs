//! Tests for two-phase shutdown handling
//!
//! Driver tests pause time, so the one-minute grace period elapses instantly
//! while the ordering of timers is preserved. The OS signal test delivers
//! real signals to the test process.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use futures::channel::mpsc as signal_mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

const GRACE: Duration = Duration::from_secs(60);

/// Records exit requests instead of terminating the test process
struct RecordingExit {
    codes: mpsc::UnboundedSender<i32>,
}

impl Exit for RecordingExit {
    fn exit(&self, code: i32) {
        let _ = self.codes.send(code);
    }
}

struct Harness {
    signals: signal_mpsc::UnboundedSender<&'static str>,
    exits: mpsc::UnboundedReceiver<i32>,
    drain: DrainState,
    handler: tokio::task::JoinHandle<()>,
}

/// Spawn the shutdown driver fed by an in-memory signal channel
fn start() -> Harness {
    let (signals, signal_rx) = signal_mpsc::unbounded();
    let (codes, exits) = mpsc::unbounded_channel();
    let drain = DrainState::new();

    let handler = tokio::spawn(handle_signals(
        signal_rx,
        drain.clone(),
        GRACE,
        Arc::new(RecordingExit { codes }),
    ));

    Harness {
        signals,
        exits,
        drain,
        handler,
    }
}

async fn wait_for_draining(drain: &DrainState) {
    while !drain.is_draining() {
        tokio::task::yield_now().await;
    }
}

/// Test that the process never exits or drains without a signal
#[tokio::test(start_paused = true)]
async fn test_no_signal_keeps_serving() {
    // ARRANGE
    let mut harness = start();

    // ACT: Let an hour pass with no signal
    let exit = tokio::time::timeout(Duration::from_secs(3600), harness.exits.recv()).await;

    // ASSERT
    assert!(exit.is_err(), "No exit without a signal");
    assert!(!harness.drain.is_draining());
}

/// Test that the first signal flips draining and the handler keeps listening
#[tokio::test(start_paused = true)]
async fn test_first_signal_starts_draining() {
    // ARRANGE
    let harness = start();

    // ACT
    harness.signals.unbounded_send("SIGTERM").unwrap();
    wait_for_draining(&harness.drain).await;

    // ASSERT
    assert!(harness.drain.is_draining());
    assert!(!harness.handler.is_finished(), "Handler keeps listening");
}

/// Test that a single signal exits at the grace period, not before
#[tokio::test(start_paused = true)]
async fn test_single_signal_exits_after_grace_period() {
    // ARRANGE
    let mut harness = start();
    let began = Instant::now();

    // ACT: One signal only
    harness.signals.unbounded_send("SIGINT").unwrap();
    wait_for_draining(&harness.drain).await;

    // ASSERT: Nothing one second before the deadline
    let early = tokio::time::timeout(GRACE - Duration::from_secs(1), harness.exits.recv()).await;
    assert!(early.is_err(), "Must not exit before the grace period");

    // ASSERT: Forced exit with status 0 once the grace period is over
    let code = harness.exits.recv().await.expect("forced exit");
    assert_eq!(code, 0);
    assert!(began.elapsed() >= GRACE);
}

/// Test that a second signal exits immediately with status 0
#[tokio::test(start_paused = true)]
async fn test_second_signal_exits_immediately() {
    // ARRANGE: Already draining
    let mut harness = start();
    let began = Instant::now();
    harness.signals.unbounded_send("SIGTERM").unwrap();
    wait_for_draining(&harness.drain).await;

    // ACT
    harness.signals.unbounded_send("SIGTERM").unwrap();

    // ASSERT
    let code = harness.exits.recv().await.expect("immediate exit");
    assert_eq!(code, 0);
    assert!(began.elapsed() < GRACE);

    tokio::time::timeout(Duration::from_secs(1), harness.handler)
        .await
        .expect("handler returns after immediate exit")
        .unwrap();
}

/// Test that SIGINT after SIGTERM counts as the second signal
#[tokio::test(start_paused = true)]
async fn test_mixed_signals_share_shutdown_logic() {
    // ARRANGE
    let mut harness = start();

    // ACT
    harness.signals.unbounded_send("SIGTERM").unwrap();
    harness.signals.unbounded_send("SIGINT").unwrap();

    // ASSERT
    let code = harness.exits.recv().await.expect("immediate exit");
    assert_eq!(code, 0);
    assert!(harness.drain.is_draining());
}

/// Test that the driver stops when the signal source goes away
#[tokio::test(start_paused = true)]
async fn test_handler_returns_when_stream_ends() {
    // ARRANGE
    let harness = start();

    // ACT
    drop(harness.signals);

    // ASSERT
    tokio::time::timeout(Duration::from_secs(1), harness.handler)
        .await
        .expect("handler returns when signals end")
        .unwrap();
    assert!(!harness.drain.is_draining());
}

/// Send a signal to this test process
#[cfg(unix)]
fn raise(signal: &str) {
    let pid = std::process::id().to_string();
    let status = std::process::Command::new("kill")
        .args([signal, &pid])
        .status()
        .expect("Failed to run kill");
    assert!(status.success(), "kill {} failed", signal);
}

/// Test that the OS signal stream yields every delivery, not just the first
///
/// SIGTERM and SIGINT are checked in one test: each stream sees every
/// delivery, so parallel tests would observe each other's signals.
#[cfg(unix)]
#[tokio::test]
async fn test_signal_stream_yields_repeated_signals() {
    use futures::StreamExt;

    // ARRANGE: Handlers are registered before any signal is sent
    let mut signals = signal_stream().expect("Failed to register signal handlers");

    for (flag, name) in [
        ("-TERM", "SIGTERM"),
        ("-TERM", "SIGTERM"),
        ("-INT", "SIGINT"),
        ("-INT", "SIGINT"),
    ] {
        // ACT
        raise(flag);
        let received = tokio::time::timeout(Duration::from_secs(5), signals.next())
            .await
            .unwrap_or_else(|_| panic!("No {} delivered within 5s", name));

        // ASSERT
        assert_eq!(received, Some(name));
    }
}
