//! Server startup and shutdown logic.
//!
//! This module contains the `run_server` function which handles:
//! - Database pool construction and connectivity verification
//! - Middleware-only router creation
//! - Server binding and graceful shutdown
//! - Pool teardown on the way out

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Request bodies above this size are rejected by the shell.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Run the web server with the given configuration.
///
/// Verifies database connectivity before binding the listener: the server
/// never accepts a request it could not serve a database connection for.
/// A failed verification propagates to `main`, which exits with status 1.
///
/// # Errors
///
/// This function will return an error if:
/// - The initial database handshake fails
/// - Server binding fails
/// - Server runtime error occurs
pub async fn run_server(config: Config, addr: String) -> AppResult<()> {
    info!("Starting bedrock server...");

    let database = Database::build(&config.database);

    info!("Connecting to database...");
    database.connect().await?;
    info!("Database connection has been established successfully");

    let app = shell_router(&config);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);

    // Set up graceful shutdown
    let shutdown_signal = create_shutdown_signal();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    database.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Middleware-only router: request tracing, CORS and a body size limit,
/// with no application routes. Every path gets the framework's default
/// not-found response.
fn shell_router(config: &Config) -> Router {
    let cors = if config.cors.allow_any() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Resolves when a shutdown signal is received: SIGINT or SIGTERM on Unix,
/// Ctrl+C elsewhere. Panics if a handler cannot be installed, since graceful
/// shutdown is impossible without one.
async fn create_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
