//! Persistence ports for the registry.
//!
//! The persistent store is the single source of truth; the registries keep
//! in-process caches in front of it. Ports are trait objects so a registry
//! can be wired to Postgres in production and to the in-memory store in
//! tests without touching registry code.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use partreg_model::{
    AccessToken, EventKind, PartitionId, Provider, ProviderId, RegisteredEvent,
    RegisteredPartition, RegisteredProvider, RegisteredSource, Source, SourceId, Window,
};

/// Store-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert. The registries convert
    /// this into "already registered"; check-then-insert is only a fast
    /// path, the constraint is what makes duplicates correct under
    /// concurrent callers.
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Insert a new source row, stamping `registered_at` with the store
    /// clock. Duplicate names surface as [`StoreError::Duplicate`].
    async fn insert_source(
        &self,
        source: &Source,
        token: &AccessToken,
    ) -> StoreResult<RegisteredSource>;

    async fn fetch_source(&self, name: &str) -> StoreResult<Option<RegisteredSource>>;
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn insert_provider(
        &self,
        provider: &Provider,
        token: &AccessToken,
    ) -> StoreResult<RegisteredProvider>;

    async fn fetch_provider(&self, name: &str) -> StoreResult<Option<RegisteredProvider>>;
}

#[async_trait]
pub trait PartitionStore: Send + Sync {
    async fn insert_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<RegisteredPartition>;

    async fn fetch_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<Option<RegisteredPartition>>;

    /// Every partition of `source` whose window intersects the half-open
    /// `window`. Backed by the `(source_id, start_at, end_at)` index.
    async fn partitions_intersecting(
        &self,
        source: SourceId,
        window: Window,
    ) -> StoreResult<Vec<RegisteredPartition>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event row. No deduplication: repeated LOCKs or UNLOCKs
    /// are each recorded.
    async fn append_event(
        &self,
        partition: PartitionId,
        kind: EventKind,
    ) -> StoreResult<RegisteredEvent>;

    /// The event with the greatest `registered_at` for each given
    /// partition. Partitions with no events are absent from the map.
    async fn latest_events(
        &self,
        partitions: &[PartitionId],
    ) -> StoreResult<HashMap<PartitionId, RegisteredEvent>>;
}

/// The four port handles a [`crate::RegistryService`] is built from.
#[derive(Clone)]
pub struct RegistryStores {
    pub sources: Arc<dyn SourceStore>,
    pub providers: Arc<dyn ProviderStore>,
    pub partitions: Arc<dyn PartitionStore>,
    pub events: Arc<dyn EventStore>,
}

impl std::fmt::Debug for RegistryStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStores").finish_non_exhaustive()
    }
}
