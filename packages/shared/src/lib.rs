//! Utilities shared by the Hookcast server and terminal client.

pub mod logger;
pub mod time;
