use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use partreg_model::{EventKind, PartitionId, RegisteredEvent, RegisteredPartition};

use crate::error::Result;
use crate::store::EventStore;

/// Append-only log of LOCK/UNLOCK readiness signals.
///
/// Appends are not deduplicated; only the event with the greatest
/// `registered_at` per partition is its current state.
pub struct EventLog {
    store: Arc<dyn EventStore>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").finish_non_exhaustive()
    }
}

impl EventLog {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn append(
        &self,
        partition: &RegisteredPartition,
        kind: EventKind,
    ) -> Result<RegisteredEvent> {
        let event = self.store.append_event(partition.id, kind).await?;
        info!(partition = %partition.id, kind = %kind, "appended partition event");
        Ok(event)
    }

    /// Latest event per partition; partitions with no event history are
    /// absent from the map, which is not an error.
    pub async fn latest_events(
        &self,
        partitions: &[RegisteredPartition],
    ) -> Result<HashMap<PartitionId, RegisteredEvent>> {
        let ids: Vec<PartitionId> = partitions.iter().map(|p| p.id).collect();
        Ok(self.store.latest_events(&ids).await?)
    }
}
