//! Draining state shared between the signal handler and the health endpoint

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a received termination signal means for the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// First signal: stop reporting healthy and start the grace period
    BeginDrain,
    /// Already draining: exit now
    ExitNow,
}

/// Shared flag recording whether the process has started draining
///
/// Starts out false and flips to true exactly once, on the first
/// termination signal. It is never reset; the process exits instead.
#[derive(Debug, Clone, Default)]
pub struct DrainState {
    draining: Arc<AtomicBool>,
}

impl DrainState {
    /// Create a new drain state (initially serving)
    pub fn new() -> Self {
        Self::default()
    }

    /// Start draining
    ///
    /// Returns true only for the call that performed the transition.
    pub fn begin_draining(&self) -> bool {
        !self.draining.swap(true, Ordering::SeqCst)
    }

    /// Check if the process is draining
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Record a termination signal and classify it
    pub fn on_signal(&self) -> SignalOutcome {
        if self.begin_draining() {
            SignalOutcome::BeginDrain
        } else {
            SignalOutcome::ExitNow
        }
    }
}
