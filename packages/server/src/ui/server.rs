//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::ServerConfig;

use super::{
    handler::{
        chat_page, get_presence, health_check, login_page, metrics_exposition, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Chat relay server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::with_addr("127.0.0.1:8404");
/// let state = build_app_state(&config, None);
/// Server::new(config, state).run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router with every route and middleware
    pub fn router(&self) -> Router {
        Router::new()
            // HTML ページ
            .route("/", get(login_page))
            .route("/login", get(login_page))
            .route("/chat", get(chat_page))
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP API
            .route("/api/health", get(health_check))
            .route("/api/presence", get(get_presence))
            .route("/metrics", get(metrics_exposition))
            // 静的ファイル
            .nest_service("/static", ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&self.config.addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Open http://{}/ in a browser", self.config.addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
