//! Hookcast server library.
//!
//! Fans webhook payloads out to every connected WebSocket client and keeps a
//! live "who is connected" roster.
//!
//! The hub (`hub`) is the only component that owns shared state: all
//! membership changes, broadcasts and presence refreshes are serialized
//! through its event loop. Each connection (`client`) runs a reader and a
//! writer loop around a bounded outbound queue.

// core
pub mod client;
pub mod hub;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
