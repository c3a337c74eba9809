//! Server lifecycle: bind, serve, shut down on signal.

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use super::{create_router, AppState};
use crate::config::Config;
use crate::error::Result;

/// Run the web application until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let sweeper = state
        .sessions
        .spawn_sweeper(config.session_sweep_interval());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Server started on http://{}", listener.local_addr()?);

    let result = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    result?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
