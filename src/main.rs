use hello_container::config::{Config, Location};
use hello_container::server::{
    bind, handle_signals, serve, signal_stream, AppState, DrainState, ProcessExit,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting hello-container");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        port = config.port,
        grace_secs = config.grace_period.as_secs(),
        "Configuration loaded"
    );

    let location = Location::from_env();
    info!(
        country = %location.country,
        location = %location.location,
        region = %location.region,
        "Location loaded"
    );

    let drain = DrainState::new();

    // Register signal handlers before serving so an early SIGTERM drains
    let signals = match signal_stream() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to register signal handlers");
            return Err(e.into());
        }
    };
    tokio::spawn(handle_signals(
        signals,
        drain.clone(),
        config.grace_period,
        Arc::new(ProcessExit),
    ));

    let listener = match bind(config.port).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, port = config.port, "Failed to bind listener");
            return Err(e.into());
        }
    };

    if let Err(e) = serve(listener, AppState::new(drain, location)).await {
        error!(error = %e, "Server failed");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}
