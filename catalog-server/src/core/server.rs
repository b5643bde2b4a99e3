//! HTTP server startup and shutdown

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::services::build_service;

pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server around an initialized state
    pub fn new(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C
    ///
    /// The signal cancels the bus token first, which closes every subscriber
    /// socket so the graceful drain can finish. If draining takes longer than
    /// `shutdown_timeout_ms` the server returns anyway.
    pub async fn run(&self) -> Result<()> {
        let state = self.state.clone();
        state.start_background_tasks();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        tracing::info!("Catalog server listening on {}", addr);

        let token = state.message_bus.shutdown_token().clone();
        let signal_bus = state.message_bus.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutting down...");
            signal_bus.shutdown();
        });

        let app = build_service(state);
        let graceful_token = token.clone();
        let serve = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { graceful_token.cancelled().await })
        .into_future();

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::select! {
            result = serve => result?,
            _ = async {
                token.cancelled().await;
                tokio::time::sleep(timeout).await;
            } => {
                tracing::warn!(timeout_ms = self.config.shutdown_timeout_ms, "Graceful shutdown timed out");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
