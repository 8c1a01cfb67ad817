//! Server execution logic.

use std::{future::Future, path::PathBuf, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{services::ServeFile, trace::TraceLayer};

use crate::{
    hub::Hub,
    usecase::{AcceptConnectionUseCase, ListClientsUseCase, PublishWebhookUseCase},
};

use super::{
    handler::{health_check, home, list_clients, webhook, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Where and how the HTTP server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding static assets (`sprite.png`)
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// Webhook fan-out server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(hub, accept_connection_usecase, publish_webhook_usecase, list_clients_usecase);
/// server.run(ServerConfig::default()).await?;
/// ```
pub struct Server {
    /// Hub（シャットダウン時に停止する）
    hub: Hub,
    /// AcceptConnectionUseCase（WebSocket 接続の受け付け）
    accept_connection_usecase: Arc<AcceptConnectionUseCase>,
    /// PublishWebhookUseCase（Webhook の配信と履歴）
    publish_webhook_usecase: Arc<PublishWebhookUseCase>,
    /// ListClientsUseCase（接続中クライアントの一覧）
    list_clients_usecase: Arc<ListClientsUseCase>,
}

impl Server {
    pub fn new(
        hub: Hub,
        accept_connection_usecase: Arc<AcceptConnectionUseCase>,
        publish_webhook_usecase: Arc<PublishWebhookUseCase>,
        list_clients_usecase: Arc<ListClientsUseCase>,
    ) -> Self {
        Self {
            hub,
            accept_connection_usecase,
            publish_webhook_usecase,
            list_clients_usecase,
        }
    }

    /// Bind to `config.host:config.port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Hookcast server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/events", bind_addr);
        tracing::info!("Send webhooks to: http://{}/webhook", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, config.assets_dir, shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The hub is stopped first so every client gets a close frame before
    /// the listener goes away.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        assets_dir: PathBuf,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let hub = self.hub.clone();
        let app = self.into_router(assets_dir);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                hub.shutdown();
            })
            .await
    }

    fn into_router(self, assets_dir: PathBuf) -> Router {
        let app_state = Arc::new(AppState {
            accept_connection_usecase: self.accept_connection_usecase,
            publish_webhook_usecase: self.publish_webhook_usecase,
            list_clients_usecase: self.list_clients_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/events", get(websocket_handler))
            // HTTP エンドポイント
            .route("/", get(home))
            .route("/webhook", post(webhook))
            .route_service("/sprite.png", ServeFile::new(assets_dir.join("sprite.png")))
            .route("/api/health", get(health_check))
            .route("/api/clients", get(list_clients))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }
}
