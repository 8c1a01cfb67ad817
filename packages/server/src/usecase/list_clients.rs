//! UseCase: registry inspection for diagnostics.

use crate::{
    domain::HubError,
    hub::{Hub, MemberSnapshot},
};

pub struct ListClientsUseCase {
    hub: Hub,
}

impl ListClientsUseCase {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    /// Registered clients in registration order.
    pub async fn execute(&self) -> Result<Vec<MemberSnapshot>, HubError> {
        self.hub.snapshot().await
    }
}
