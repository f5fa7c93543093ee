//! Server Implementation
//!
//! HTTP server startup and shutdown

use crate::core::{Config, Result, ServerError, ServerState};
use crate::services::auth as auth_service;

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<()> {
        let state = ServerState::initialize(self.config.clone()).await?;

        if let (Some(email), Some(password)) =
            (&self.config.admin_email, &self.config.admin_password)
        {
            auth_service::bootstrap_admin(&state.pool, email, password)
                .await
                .map_err(|e| ServerError::Bootstrap(e.to_string()))?;
        }

        if self.config.is_production() && self.config.cors_origins.iter().any(|o| o == "*") {
            tracing::warn!("CORS allows any origin in production; set CORS_ORIGINS");
        }

        let app = crate::api::build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Shop server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
