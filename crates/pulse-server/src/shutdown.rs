//! Serving with a bounded graceful-shutdown window.

use std::future::Future;
use std::io;
use std::time::Duration;

use axum::Router;
use pulse_core::error::{PulseError, Result};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio::sync::oneshot;
use tokio::task::JoinError;

/// Waits for SIGTERM or SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}

/// Serve `app` until `signal` resolves, then stop accepting connections and
/// give in-flight requests up to `grace` to finish.
///
/// Returns an error if the server fails, or if the grace period elapses with
/// requests still running (they are aborted).
pub async fn serve_with_shutdown(
    listener: TcpListener,
    app: Router,
    grace: Duration,
    signal: impl Future<Output = ()>,
) -> Result<()> {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => return flatten(res),
        () = signal => {}
    }

    tracing::info!(grace_ms = grace.as_millis() as u64, "shutting down server");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => flatten(res),
        Err(_) => {
            server.abort();
            Err(PulseError::Internal(format!(
                "server forced to shutdown: in-flight requests still running after {grace:?}"
            )))
        }
    }
}

fn flatten(res: std::result::Result<io::Result<()>, JoinError>) -> Result<()> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PulseError::Internal(format!("server failed: {e}"))),
        Err(e) => Err(PulseError::Internal(format!("server task failed: {e}"))),
    }
}
