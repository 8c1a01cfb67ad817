//! The hub: sole owner of the client registry.
//!
//! [`Hub`] is a cheap, cloneable handle. Every operation is turned into a
//! [`HubCommand`] and sent to a single event loop ([`actor`]), which applies
//! the commands one at a time. This total order is what keeps fan-out from
//! ever observing a half-updated registry.

mod actor;

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{Activity, Broadcaster, ConnectionId, DisplayName, HubError, RosterFormatter};

use actor::HubActor;

/// Registry entry of one connected client.
///
/// Holds the only sender of the client's outbound queue: dropping the member
/// closes the queue, which terminates the client's writer loop.
#[derive(Debug)]
pub struct Member {
    id: ConnectionId,
    name: DisplayName,
    activity: Activity,
    queue: mpsc::Sender<Bytes>,
}

impl Member {
    pub fn new(id: ConnectionId, name: DisplayName, queue: mpsc::Sender<Bytes>) -> Self {
        Self {
            id,
            name,
            activity: Activity::Active,
            queue,
        }
    }
}

/// Read-only view of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSnapshot {
    pub id: ConnectionId,
    pub name: DisplayName,
    pub activity: Activity,
}

/// Events consumed by the hub loop.
#[derive(Debug)]
enum HubCommand {
    Register(Member),
    Unregister(ConnectionId),
    Broadcast(Bytes),
    SetActivity(ConnectionId, Activity),
    Snapshot(oneshot::Sender<Vec<MemberSnapshot>>),
    Shutdown,
}

/// Handle to the hub event loop.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<HubCommand>,
    next_id: Arc<AtomicU64>,
}

impl Hub {
    /// Start the hub loop on the current tokio runtime.
    ///
    /// The loop runs until [`Hub::shutdown`] is called or every handle is
    /// dropped. `formatter` renders the presence roster sent to each client.
    pub fn spawn(formatter: Arc<dyn RosterFormatter>) -> (Self, JoinHandle<()>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(HubActor::new(receiver, formatter).run());
        let hub = Self {
            commands,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (hub, handle)
    }

    /// Allocate an id for a new connection.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add a client to the registry and schedule a presence refresh.
    ///
    /// Each connection must be registered once; callers create a fresh
    /// [`Member`] per connection.
    pub fn register(&self, member: Member) {
        self.send(HubCommand::Register(member));
    }

    /// Remove a client and close its outbound queue. Unknown ids are ignored.
    pub fn unregister(&self, id: ConnectionId) {
        self.send(HubCommand::Unregister(id));
    }

    /// Record a client's activity flag. Unknown ids are ignored.
    pub fn set_activity(&self, id: ConnectionId, activity: Activity) {
        self.send(HubCommand::SetActivity(id, activity));
    }

    /// Enqueue `payload` for every client registered when the hub processes it.
    pub fn broadcast(&self, payload: Bytes) -> Result<(), HubError> {
        self.commands
            .send(HubCommand::Broadcast(payload))
            .map_err(|_| HubError::Stopped)
    }

    /// Current registry contents in registration order.
    ///
    /// Answered by the hub loop after every previously sent command and any
    /// pending presence refresh, so it doubles as a quiescence barrier.
    pub async fn snapshot(&self) -> Result<Vec<MemberSnapshot>, HubError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HubCommand::Snapshot(reply))
            .map_err(|_| HubError::Stopped)?;
        response.await.map_err(|_| HubError::Stopped)
    }

    /// Stop the hub loop. Every registered client's queue is closed.
    pub fn shutdown(&self) {
        self.send(HubCommand::Shutdown);
    }

    fn send(&self, command: HubCommand) {
        if let Err(e) = self.commands.send(command) {
            tracing::debug!("Hub is not running, dropping {:?}", e.0);
        }
    }
}

impl Broadcaster for Hub {
    fn broadcast(&self, payload: Bytes) -> Result<(), HubError> {
        Hub::broadcast(self, payload)
    }
}
