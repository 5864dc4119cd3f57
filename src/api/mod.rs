mod decode;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::contracts::{NumberStore, NumbersError};

pub use decode::{DecodedNumber, NumberRequest};
pub use handlers::{ApiError, AppState, ErrorResponse, NumbersResponse};

/// Creates the API router.
pub fn create_router<S: NumberStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/numbers",
            get(handlers::list_numbers::<S>)
                .post(handlers::add_number::<S>)
                // HEAD would otherwise be served by the GET handler.
                .head(handlers::method_not_allowed)
                .fallback(handlers::method_not_allowed),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Starts the HTTP server and runs until `shutdown` resolves.
pub async fn start_server<S, F>(
    config: ServerConfig,
    state: Arc<AppState<S>>,
    shutdown: F,
) -> Result<(), NumbersError>
where
    S: NumberStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
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
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
