//! Bundled static-file host.
//!
//! Serves a directory through `tower-http` with the pageview middleware in
//! front of it. Useful on its own for static sites and as a reference for
//! wiring the middleware into an existing axum application.

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::services::ServeDir;

use crate::middleware::{PageviewHandler, tracing};

/// Settings of the bundled host.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub root: PathBuf,
}

/// Builds the router: static files, pageview middleware, access log.
pub fn app_router(handler: &PageviewHandler, root: impl Into<PathBuf>) -> Router {
    let router = Router::new().fallback_service(ServeDir::new(root.into()));

    let site = handler.relay().config().domain_name.clone();
    handler.apply(router).layer(tracing::layer(&site))
}

/// Runs the host until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run(config: ServerConfig, handler: PageviewHandler) -> Result<()> {
    let app = app_router(&handler, &config.root);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    ::tracing::info!(
        "Listening on http://{} (serving {})",
        config.listen_addr,
        config.root.display()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    ::tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ::tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    ::tracing::info!("Shutdown signal received");
}
