//! Domain types for the hub and its clients.
//!
//! Everything here is free of I/O. The presence renderer is a pure function
//! of the registry contents and the viewer.

mod connection;
mod error;
mod history;
mod presence;

pub use connection::{Activity, ConnectionId, ControlToken, DisplayName, DisplayNameError};
pub use error::{HubError, TransportError};
pub use history::{DEFAULT_HISTORY_SIZE, HistoryEntry, MessageHistory};
pub use presence::{Roster, RosterEntry, RosterFormatter, render_roster};

#[cfg(test)]
pub use presence::MockRosterFormatter;

use bytes::Bytes;

/// Fan-out ingress for externally sourced payloads.
///
/// Implemented by [`crate::hub::Hub`]; use cases depend on this trait so they
/// can be tested without a running hub.
#[cfg_attr(test, mockall::automock)]
pub trait Broadcaster: Send + Sync {
    /// Enqueue `payload` for every currently registered client.
    fn broadcast(&self, payload: Bytes) -> Result<(), HubError>;
}
