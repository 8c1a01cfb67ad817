//! UseCase errors.

use thiserror::Error;

use crate::domain::HubError;

/// Errors of [`super::PublishWebhookUseCase`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("broadcast is unavailable: {0}")]
    Unavailable(#[from] HubError),
}
