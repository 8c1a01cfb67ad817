//! Writer loop: the only writer of a connection.

use std::{fmt::Display, time::Duration};

use axum::extract::ws::Message;
use bytes::{BufMut, Bytes, BytesMut};
use futures_util::{Sink, SinkExt};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};

use crate::domain::TransportError;

/// Separator between payloads coalesced into one frame.
const NEWLINE: u8 = b'\n';

/// Drain the outbound queue into the sink and keep the peer alive with pings.
///
/// Returns `Ok(())` after the queue was closed by the hub and the close frame
/// was attempted.
pub(crate) async fn write_pump<S>(
    mut sink: S,
    mut queue: mpsc::Receiver<Bytes>,
    ping_period: Duration,
    write_wait: Duration,
) -> Result<(), TransportError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + ping_period, ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            item = queue.recv() => match item {
                Some(first) => {
                    let frame = coalesce(first, &mut queue);
                    send(&mut sink, into_message(frame), write_wait).await?;
                }
                None => {
                    // The hub closed the queue.
                    if let Err(e) = send(&mut sink, Message::Close(None), write_wait).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    return Ok(());
                }
            },
            _ = ticker.tick() => {
                send(&mut sink, Message::Ping(Bytes::new()), write_wait).await?;
            }
        }
    }
}

/// Append every payload already waiting in the queue to `first`.
///
/// Only items present at this instant are taken, so a steady producer
/// cannot keep one frame growing forever.
fn coalesce(first: Bytes, queue: &mut mpsc::Receiver<Bytes>) -> Bytes {
    let pending = queue.len();
    if pending == 0 {
        return first;
    }

    let mut frame = BytesMut::from(&first[..]);
    for _ in 0..pending {
        match queue.try_recv() {
            Ok(next) => {
                frame.put_u8(NEWLINE);
                frame.extend_from_slice(&next);
            }
            Err(_) => break,
        }
    }
    frame.freeze()
}

/// UTF-8 payloads go out as text frames, anything else as binary.
fn into_message(frame: Bytes) -> Message {
    match std::str::from_utf8(&frame) {
        Ok(text) => Message::Text(text.to_owned().into()),
        Err(_) => Message::Binary(frame),
    }
}

async fn send<S>(sink: &mut S, message: Message, write_wait: Duration) -> Result<(), TransportError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match tokio::time::timeout(write_wait, sink.send(message)).await {
        Err(_) => Err(TransportError::WriteTimeout(write_wait)),
        Ok(Err(e)) => Err(TransportError::Write(e.to_string())),
        Ok(Ok(())) => Ok(()),
    }
}
