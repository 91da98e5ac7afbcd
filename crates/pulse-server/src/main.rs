//! pulse server binary.
//!
//! - Config: defaults, optional `PULSE_CONFIG` YAML, `PORT` / `VERSION` env
//! - Every request goes through the metrics middleware
//! - SIGINT/SIGTERM: drain in-flight requests within the shutdown window

use pulse_core::error::{PulseError, Result};
use tracing_subscriber::{fmt, EnvFilter};

use pulse_server::{app_state::AppState, config, router, shutdown};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, kind = e.kind(), "pulse-server exiting");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen = cfg.server.listen_addr();
    let grace = cfg.server.shutdown_timeout();

    tracing::info!(%listen, version = %cfg.app.version, "pulse-server starting");

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| PulseError::Internal(format!("failed to bind {listen}: {e}")))?;

    shutdown::serve_with_shutdown(listener, app, grace, shutdown::shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}
