//! Server-side representative of one WebSocket connection.
//!
//! A [`Client`] owns the receiving end of its bounded outbound queue and,
//! once [`Client::run`] is called, the transport. It runs two loops:
//!
//! - [`reader::read_pump`]: the only reader; enforces the liveness deadline
//!   and turns control tokens into hub events.
//! - [`writer::write_pump`]: the only writer; drains the queue (coalescing
//!   bursts) and sends keepalive pings.
//!
//! When either loop ends the client unregisters itself from the hub exactly
//! once.

mod reader;
mod writer;

use std::{fmt::Display, time::Duration};

use axum::extract::ws::Message;
use bytes::Bytes;
use futures_util::{Sink, Stream};
use tokio::{sync::mpsc, task::JoinError};

use crate::{
    domain::{ConnectionId, DisplayName, TransportError},
    hub::{Hub, Member},
};

/// Capacity of each client's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Maximum size of a frame accepted from a client.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;
/// Time allowed between two frames received from a client.
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
/// Time allowed to write one frame to a client.
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);

/// Lower bound of the keepalive interval; the ticker rejects a zero period.
const MIN_PING_PERIOD: Duration = Duration::from_millis(1);

/// Per-connection limits and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub queue_capacity: usize,
    pub max_message_size: usize,
    pub pong_wait: Duration,
    pub write_wait: Duration,
}

impl ConnectionSettings {
    /// Keepalive interval, 9/10 of the read deadline.
    ///
    /// Never zero, even for a zero `pong_wait`.
    pub fn ping_period(&self) -> Duration {
        (self.pong_wait * 9 / 10).max(MIN_PING_PERIOD)
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            pong_wait: DEFAULT_PONG_WAIT,
            write_wait: DEFAULT_WRITE_WAIT,
        }
    }
}

pub struct Client {
    id: ConnectionId,
    name: DisplayName,
    hub: Hub,
    queue: mpsc::Receiver<Bytes>,
    settings: ConnectionSettings,
}

impl Client {
    /// Create a client and the registry entry the hub will hold for it.
    ///
    /// The returned [`Member`] carries the only sender of the outbound queue.
    pub fn new(hub: Hub, name: DisplayName, settings: ConnectionSettings) -> (Self, Member) {
        let id = hub.next_connection_id();
        let (sender, queue) = mpsc::channel(settings.queue_capacity.max(1));
        let member = Member::new(id, name.clone(), sender);
        let client = Self {
            id,
            name,
            hub,
            queue,
            settings,
        };
        (client, member)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Run the reader and writer loops over an already upgraded transport.
    ///
    /// Returns once both loops are done and the client is unregistered.
    pub async fn run<S, R, E>(self, sink: S, stream: R)
    where
        S: Sink<Message> + Send + Unpin + 'static,
        S::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Send + Unpin + 'static,
        E: Display + Send + 'static,
    {
        let Client {
            id,
            name,
            hub,
            queue,
            settings,
        } = self;

        let mut reader = tokio::spawn(reader::read_pump(
            stream,
            id,
            hub.clone(),
            settings.pong_wait,
        ));
        let mut writer = tokio::spawn(writer::write_pump(
            sink,
            queue,
            settings.ping_period(),
            settings.write_wait,
        ));

        let writer_done = tokio::select! {
            result = &mut reader => {
                log_exit(id, &name, "reader", result);
                false
            }
            result = &mut writer => {
                log_exit(id, &name, "writer", result);
                reader.abort();
                true
            }
        };

        hub.unregister(id);

        // Unregistering closes the queue, so the writer sends its close frame
        // and stops on its own.
        if !writer_done {
            match tokio::time::timeout(settings.write_wait, &mut writer).await {
                Ok(result) => log_exit(id, &name, "writer", result),
                Err(_) => {
                    tracing::debug!("Writer of client {} did not stop in time", id);
                    writer.abort();
                }
            }
        }
    }
}

fn log_exit(
    id: ConnectionId,
    name: &DisplayName,
    pump: &str,
    result: Result<Result<(), TransportError>, JoinError>,
) {
    match result {
        Ok(Ok(())) => tracing::info!("Client {} ({}) {} finished", id, name, pump),
        Ok(Err(TransportError::ReadTimeout(wait))) => tracing::info!(
            "Client {} ({}) timed out after {:?} without a frame",
            id,
            name,
            wait
        ),
        Ok(Err(e)) => tracing::warn!("Client {} ({}) {} failed: {}", id, name, pump, e),
        Err(e) if e.is_cancelled() => {}
        Err(e) => tracing::error!("Client {} ({}) {} panicked: {}", id, name, pump, e),
    }
}
