//! Webhook HTTP server with axum router and graceful shutdown.

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use super::error::ServiceError;
use super::handlers::{get_healthz, post_todoist, root, AppState};

/// Default port for the webhook server.
pub const DEFAULT_PORT: u16 = 5005;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Configuration for the webhook server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/todoist", post(post_todoist))
        .route("/healthz", get(get_healthz))
        .route("/", get(root).post(root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server receiving Todoist webhooks.
pub struct WebhookServer {
    config: ServerConfig,
    state: AppState,
}

impl WebhookServer {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            config: ServerConfig::default(),
            state,
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until `cancel` fires, then shut down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServiceError> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServiceError::Bind {
                address: address.clone(),
                source,
            })?;
        serve(listener, self.state, cancel).await
    }
}

/// Serve on an already bound listener until `cancel` fires.
///
/// # Errors
///
/// Returns `ServiceError::Serve` if the server stops with an I/O error.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> Result<(), ServiceError> {
    let app = build_router(state);
    if let Ok(address) = listener.local_addr() {
        tracing::info!(address = %address, "Starting webhook server");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
            tracing::info!("Webhook server shutting down gracefully");
        })
        .await
        .map_err(ServiceError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5005);
        assert_eq!(config.host, "0.0.0.0");
    }
}
