//! The hub event loop.

use std::{collections::BTreeMap, ops::ControlFlow, sync::Arc};

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{ConnectionId, RosterFormatter, render_roster};

use super::{HubCommand, Member, MemberSnapshot};

/// State owned by the hub task. Nothing else can reach the registry.
pub(super) struct HubActor {
    commands: mpsc::UnboundedReceiver<HubCommand>,
    formatter: Arc<dyn RosterFormatter>,
    /// Ordered by id, i.e. by registration order.
    registry: BTreeMap<ConnectionId, Member>,
    /// Set when membership or activity changed since the last roster refresh.
    presence_dirty: bool,
}

impl HubActor {
    pub(super) fn new(
        commands: mpsc::UnboundedReceiver<HubCommand>,
        formatter: Arc<dyn RosterFormatter>,
    ) -> Self {
        Self {
            commands,
            formatter,
            registry: BTreeMap::new(),
            presence_dirty: false,
        }
    }

    /// Apply commands until shutdown or until every handle is dropped.
    ///
    /// Commands that are already queued when the loop wakes up form one
    /// batch; the roster is refreshed at most once per batch.
    pub(super) async fn run(mut self) {
        tracing::info!("Hub started");

        while let Some(command) = self.commands.recv().await {
            let mut flow = self.apply(command);
            while flow.is_continue() {
                match self.commands.try_recv() {
                    Ok(command) => flow = self.apply(command),
                    Err(_) => break,
                }
            }

            self.flush_presence();

            if flow.is_break() {
                break;
            }
        }

        tracing::info!(
            "Hub stopped, closing {} client queue(s)",
            self.registry.len()
        );
        self.registry.clear();
    }

    fn apply(&mut self, command: HubCommand) -> ControlFlow<()> {
        match command {
            HubCommand::Register(member) => self.register(member),
            HubCommand::Unregister(id) => self.unregister(id),
            HubCommand::Broadcast(payload) => self.broadcast(payload),
            HubCommand::SetActivity(id, activity) => {
                if let Some(member) = self.registry.get_mut(&id)
                    && member.activity != activity
                {
                    tracing::debug!("Client {} ({}) is now {:?}", id, member.name, activity);
                    member.activity = activity;
                    self.presence_dirty = true;
                }
            }
            HubCommand::Snapshot(reply) => {
                self.flush_presence();
                let snapshot = self
                    .registry
                    .values()
                    .map(|member| MemberSnapshot {
                        id: member.id,
                        name: member.name.clone(),
                        activity: member.activity,
                    })
                    .collect();
                // The caller may have given up waiting.
                let _ = reply.send(snapshot);
            }
            HubCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn register(&mut self, member: Member) {
        let id = member.id;
        tracing::info!(
            "Registering client {} ({}), total={}",
            id,
            member.name,
            self.registry.len() + 1
        );
        if let Some(previous) = self.registry.insert(id, member) {
            tracing::warn!("Client {} ({}) was registered twice", id, previous.name);
        }
        self.presence_dirty = true;
    }

    fn unregister(&mut self, id: ConnectionId) {
        match self.registry.remove(&id) {
            Some(member) => {
                tracing::info!(
                    "Unregistering client {} ({}), total={}",
                    id,
                    member.name,
                    self.registry.len()
                );
                self.presence_dirty = true;
            }
            None => tracing::debug!("Client {} is already unregistered", id),
        }
    }

    fn broadcast(&mut self, payload: Bytes) {
        let mut rejected = Vec::new();
        for member in self.registry.values() {
            if let Err(e) = member.queue.try_send(payload.clone()) {
                rejected.push((member.id, e));
            }
        }
        tracing::debug!(
            "Broadcasted {} bytes to {} client(s)",
            payload.len(),
            self.registry.len() - rejected.len()
        );
        self.evict(rejected);
    }

    /// Send each member its own roster until no refresh is pending.
    ///
    /// Evicting a member during a refresh changes the registry, so another
    /// pass follows; every extra pass removes at least one member.
    fn flush_presence(&mut self) {
        while self.presence_dirty {
            self.presence_dirty = false;
            self.refresh_presence();
        }
    }

    fn refresh_presence(&mut self) {
        let mut rejected = Vec::new();
        for viewer in self.registry.values() {
            let roster = render_roster(
                self.registry
                    .values()
                    .map(|member| (member.id, &member.name, member.activity)),
                viewer.id,
            );
            let payload = self.formatter.format(&roster);
            if let Err(e) = viewer.queue.try_send(payload) {
                rejected.push((viewer.id, e));
            }
        }
        tracing::debug!("Refreshed presence for {} client(s)", self.registry.len());
        self.evict(rejected);
    }

    /// Drop clients whose queue refused a payload.
    ///
    /// Dropping the member closes its queue: the writer flushes what is
    /// already queued, sends a close frame and ends the connection.
    fn evict(&mut self, rejected: Vec<(ConnectionId, TrySendError<Bytes>)>) {
        for (id, error) in rejected {
            let Some(member) = self.registry.remove(&id) else {
                continue;
            };
            match error {
                TrySendError::Full(_) => tracing::warn!(
                    "Outbound queue of client {} ({}) is full, disconnecting it",
                    id,
                    member.name
                ),
                TrySendError::Closed(_) => tracing::debug!(
                    "Writer of client {} ({}) is gone, removing it",
                    id,
                    member.name
                ),
            }
            self.presence_dirty = true;
        }
    }
}
