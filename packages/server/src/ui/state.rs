//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::{AcceptConnectionUseCase, ListClientsUseCase, PublishWebhookUseCase};

/// Shared application state
pub struct AppState {
    /// AcceptConnectionUseCase（WebSocket 接続の受け付け）
    pub accept_connection_usecase: Arc<AcceptConnectionUseCase>,
    /// PublishWebhookUseCase（Webhook の配信と履歴）
    pub publish_webhook_usecase: Arc<PublishWebhookUseCase>,
    /// ListClientsUseCase（接続中クライアントの一覧）
    pub list_clients_usecase: Arc<ListClientsUseCase>,
}
