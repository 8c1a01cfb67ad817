//! Webhook publication from the command line.

use crate::error::ClientError;

/// POST `payload` to the server's `/webhook` endpoint.
///
/// # Errors
///
/// `ClientError::Request` when the server cannot be reached and
/// `ClientError::Rejected` for any non-success status (503 once the server is
/// shutting down).
pub async fn post_webhook(
    client: &reqwest::Client,
    url: &str,
    payload: String,
) -> Result<(), ClientError> {
    let response = client.post(url).body(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Rejected(status));
    }

    tracing::info!("Webhook accepted ({})", status);
    Ok(())
}
