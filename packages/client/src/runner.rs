//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{
    domain::{build_events_url, failed_attempts_after, should_attempt_reconnect},
    error::ClientError,
    session::run_watch_session,
    ui::spawn_input_reader,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Watch the webhook stream, reconnecting when the connection drops.
///
/// Each outage gets its own budget of attempts: the count restarts once a
/// session was established.
///
/// # Errors
///
/// Returns the last error once the URL is invalid or the reconnect attempts
/// are exhausted.
pub async fn run_watcher(url: String, name: Option<String>) -> Result<(), ClientError> {
    let events_url = build_events_url(&url, name.as_deref())?;
    let prompt = match name.as_deref() {
        Some(name) => format!("{}> ", name),
        None => "> ".to_string(),
    };
    let mut input = spawn_input_reader(prompt.clone());
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            events_url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_watch_session(events_url.as_str(), &prompt, &mut input).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("{}", e);
                reconnect_count = failed_attempts_after(&e, reconnect_count);

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
