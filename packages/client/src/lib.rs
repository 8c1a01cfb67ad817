//! Terminal viewer for a Hookcast server.
//!
//! - `watch`: follow the broadcast stream, printing webhook messages and the
//!   presence roster, and report tab visibility with `/hide` and `/show`.
//! - `post`: send a webhook payload.

mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;
mod webhook;

pub use error::ClientError;
pub use runner::run_watcher;
pub use webhook::post_webhook;
