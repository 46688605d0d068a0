//! HTTP server and shutdown handling
//!
//! Provides the container endpoints:
//! - `/_health` - Health check that flips to "draining" on shutdown
//! - `/protocol` - Echo of the negotiated HTTP version
//! - `/*` - Deployment location report
//!
//! Also provides two-phase shutdown handling for SIGTERM/SIGINT.

mod draining;
mod routes;
pub mod shutdown;

pub use draining::{DrainState, SignalOutcome};
pub use routes::{bind, build_router, protocol_name, serve, AppState};
pub use shutdown::{handle_signals, signal_stream, Exit, ProcessExit};

#[cfg(test)]
#[path = "draining_test.rs"]
mod draining_tests;

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
