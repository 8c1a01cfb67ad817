//! Connection identity and per-connection state.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters kept from a display name.
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// Process-unique identifier of one connection.
///
/// Allocated in increasing order, so ordering by id is registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("display name is empty")]
    Empty,
}

/// Human-readable name shown in the roster. Not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim surrounding whitespace and cap the length at
    /// [`MAX_DISPLAY_NAME_CHARS`] characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DisplayNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DisplayNameError::Empty);
        }
        Ok(Self(trimmed.chars().take(MAX_DISPLAY_NAME_CHARS).collect()))
    }

    /// Name used when the caller supplies nothing usable.
    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DisplayNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the client's page is currently visible to its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    #[default]
    Active,
    Inactive,
}

impl Activity {
    pub fn is_active(&self) -> bool {
        matches!(self, Activity::Active)
    }
}

/// Control tokens a client may send. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlToken {
    Visible,
    Hidden,
}

impl ControlToken {
    /// Recognize an inbound payload. Matching is exact (no trimming, case
    /// sensitive).
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            b"visible" => Some(ControlToken::Visible),
            b"hidden" => Some(ControlToken::Hidden),
            _ => None,
        }
    }

    pub fn activity(&self) -> Activity {
        match self {
            ControlToken::Visible => Activity::Active,
            ControlToken::Hidden => Activity::Inactive,
        }
    }
}
