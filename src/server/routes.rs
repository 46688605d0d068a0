//! HTTP endpoints
//!
//! - `/_health` - 200 "ok", or 400 "draining" once shutdown has started
//! - `/protocol` - HTTP version negotiated for the request
//! - anything else - where this container is running
//!
//! All routes accept any method. The listener speaks HTTP/1.1 and
//! prior-knowledge HTTP/2 over cleartext (h2c) on the same port. The
//! HTTP/1.1 `Upgrade: h2c` handshake is not supported; such requests are
//! answered over HTTP/1.1.

use axum::{
    extract::State,
    http::{StatusCode, Version},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::draining::DrainState;
use crate::config::Location;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    drain: DrainState,
    location: Arc<Location>,
}

impl AppState {
    /// Create new handler state
    pub fn new(drain: DrainState, location: Location) -> Self {
        Self {
            drain,
            location: Arc::new(location),
        }
    }
}

/// Health check handler
///
/// Returns 400 while draining so the load balancer stops sending traffic.
async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.drain.is_draining() {
        debug!("Health check while draining");
        (StatusCode::BAD_REQUEST, "draining")
    } else {
        (StatusCode::OK, "ok")
    }
}

/// Protocol echo handler
async fn protocol(version: Version) -> String {
    format!("Request Protocol: {}\n", protocol_name(version))
}

/// Default route: report the deployment location
async fn metadata(State(state): State<AppState>) -> String {
    state.location.greeting()
}

/// Wire name of an HTTP version, e.g. `HTTP/1.1` or `HTTP/2.0`
pub fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "unknown",
    }
}

/// Build the router for all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/_health", any(health))
        .route("/protocol", any(protocol))
        .fallback(metadata)
        .with_state(state)
}

/// Bind the listener on all interfaces
///
/// # Errors
/// Returns the bind error; callers treat it as fatal.
pub async fn bind(port: u16) -> Result<TcpListener, std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    // Log after successful bind - server is actually listening
    info!(port = %port, "Server listening (HTTP/1.1 + h2c)");
    Ok(listener)
}

/// Serve the endpoints on an already bound listener
///
/// Each connection runs as its own task. Runs until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    let app = build_router(state);

    axum::serve(listener, app).await
}
