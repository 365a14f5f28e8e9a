//! Graceful shutdown

use std::{io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler")]
    SigTerm(#[source] io::Error),
}

/// Resolves with the name of the first shutdown signal received.
async fn wait_for_signal() -> Result<&'static str, ShutdownSignalError> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?;

        tokio::select! {
            result = signal::ctrl_c() => result.map(|()| "ctrl_c").map_err(ShutdownSignalError::CtrlC),
            _ = terminate.recv() => Ok("sigterm"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .map(|()| "ctrl_c")
            .map_err(ShutdownSignalError::CtrlC)
    }
}

/// Stops the server once a signal arrives, letting in-flight requests finish
/// within `grace`.
pub(crate) async fn listen(handle: ServerHandle, grace: Duration) -> Result<(), ShutdownSignalError> {
    let received = wait_for_signal().await?;

    info!(signal = received, grace_secs = grace.as_secs(), "shutting down");

    handle.stop_graceful(Some(grace));

    Ok(())
}
