//! # Ratekeeper API Server
//!
//! HTTP front end over the exchange-rate service.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /api/v1/rates/:source/:target` - Latest rate for a pair, or `null`
//! - `PUT /api/v1/rates` - Insert or overwrite a dated rate
//! - `DELETE /api/v1/rates/:source/:target/:date` - Remove a dated rate
//!
//! ## Example
//!
//! ```rust,ignore
//! use ratekeeper_server::{ApiServer, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let server = ApiServer::from_config(&config).await?;
//! server.run(([0, 0, 0, 0], config.listen_port)).await?;
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod error;
mod handlers;
mod routes;
mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ratekeeper_fx::FxResult;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for Ratekeeper.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Builds the repository and rate service described by `config`.
    pub async fn from_config(config: &ServerConfig) -> FxResult<Self> {
        Ok(Self::new(AppState::from_config(config).await?))
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address until Ctrl-C.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            %addr,
            repository = self.state.service.repository_name(),
            "Ratekeeper API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
