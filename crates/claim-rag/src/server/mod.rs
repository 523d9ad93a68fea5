//! HTTP server for claim adjudication

pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{RagConfig, ServerConfig};
use crate::error::{Error, Result};
use state::AppState;

/// Build the router with all routes and middleware
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(routes::claim_routes())
        .with_state(state)
        // Middleware layers (applied bottom to top)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Claim adjudication HTTP server
pub struct ClaimServer {
    config: RagConfig,
    state: AppState,
}

impl ClaimServer {
    /// Load the engine and prepare the server
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::from_config(&config).await?;
        Ok(Self { config, state })
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = router(self.state, &self.config.server);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Starting claim server on http://{}", addr);
        tracing::info!("Submit claims with POST http://{}/process_claim", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
