//! UseCase layer: what the HTTP surface asks the core to do.

mod accept_connection;
mod error;
mod list_clients;
mod publish_webhook;

pub use accept_connection::{AcceptConnectionUseCase, resolve_display_name};
pub use error::PublishError;
pub use list_clients::ListClientsUseCase;
pub use publish_webhook::PublishWebhookUseCase;
