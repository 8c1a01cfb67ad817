//! Reader loop: the only reader of a connection.

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use std::{fmt::Display, time::Duration};

use crate::{
    domain::{ConnectionId, ControlToken, TransportError},
    hub::Hub,
};

/// Read frames until the peer goes away.
///
/// Every read is bounded by `pong_wait`, so any received frame (pongs
/// included) pushes the liveness deadline forward. `visible`/`hidden` update
/// the client's activity through the hub; every other payload is dropped.
///
/// Returns `Ok(())` when the peer closed the connection.
pub(crate) async fn read_pump<R, E>(
    mut stream: R,
    id: ConnectionId,
    hub: Hub,
    pong_wait: Duration,
) -> Result<(), TransportError>
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let message = match tokio::time::timeout(pong_wait, stream.next()).await {
            Err(_) => return Err(TransportError::ReadTimeout(pong_wait)),
            Ok(None) => return Ok(()),
            Ok(Some(Err(e))) => return Err(TransportError::Read(e.to_string())),
            Ok(Some(Ok(message))) => message,
        };

        let payload: &[u8] = match &message {
            Message::Text(text) => text.as_str().as_bytes(),
            Message::Binary(data) => &data[..],
            Message::Close(_) => {
                tracing::debug!("Client {} sent a close frame", id);
                return Ok(());
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        match ControlToken::parse(payload) {
            Some(token) => hub.set_activity(id, token.activity()),
            None => tracing::debug!(
                "Ignoring {} byte payload from client {}",
                payload.len(),
                id
            ),
        }
    }
}
