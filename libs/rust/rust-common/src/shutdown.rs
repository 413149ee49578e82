//! Graceful shutdown signal shared by the service binaries.

use tracing::info;

/// Resolves when the process receives Ctrl-C or, on Unix, SIGTERM.
///
/// Pass it to `serve_with_shutdown` / `with_graceful_shutdown` so in-flight
/// requests finish before the listener closes.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!(signal = "SIGINT", "Shutdown signal received"),
        () = terminate => info!(signal = "SIGTERM", "Shutdown signal received"),
    }
}
