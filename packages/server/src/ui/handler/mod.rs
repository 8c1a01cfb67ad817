//! Request handlers.

mod http;
mod websocket;

pub use http::{health_check, home, list_clients, webhook};
pub use websocket::websocket_handler;
