//! In-memory implementation of the store ports.
//!
//! Mirrors the Postgres semantics — uniqueness violations, half-open
//! intersection scans, latest-event resolution — over mutex-guarded
//! tables. Used by unit and integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use partreg_model::{
    AccessToken, EventKind, PartitionId, Provider, ProviderId, RegisteredEvent,
    RegisteredPartition, RegisteredProvider, RegisteredSource, Source, SourceId, Window,
};

use super::{
    EventStore, PartitionStore, ProviderStore, RegistryStores, SourceStore, StoreError,
    StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    sources: Vec<RegisteredSource>,
    providers: Vec<RegisteredProvider>,
    partitions: Vec<RegisteredPartition>,
    events: Vec<RegisteredEvent>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Port handles over one shared set of tables.
    pub fn stores(self: &Arc<Self>) -> RegistryStores {
        RegistryStores {
            sources: self.clone(),
            providers: self.clone(),
            partitions: self.clone(),
            events: self.clone(),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Entities are immutable once inserted, so a poisoned lock cannot
        // hold a half-applied write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    async fn insert_source(
        &self,
        source: &Source,
        token: &AccessToken,
    ) -> StoreResult<RegisteredSource> {
        let mut tables = self.tables();
        if tables.sources.iter().any(|s| s.name == source.name) {
            return Err(StoreError::Duplicate("source already exists".into()));
        }
        let id = tables.next_id();
        let registered = RegisteredSource {
            id: SourceId(id),
            name: source.name.clone(),
            owner: source.owner.clone(),
            access_token: token.clone(),
            registered_at: Utc::now(),
        };
        tables.sources.push(registered.clone());
        Ok(registered)
    }

    async fn fetch_source(&self, name: &str) -> StoreResult<Option<RegisteredSource>> {
        Ok(self.tables().sources.iter().find(|s| s.name == name).cloned())
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn insert_provider(
        &self,
        provider: &Provider,
        token: &AccessToken,
    ) -> StoreResult<RegisteredProvider> {
        let mut tables = self.tables();
        if tables.providers.iter().any(|p| p.name == provider.name) {
            return Err(StoreError::Duplicate("provider already exists".into()));
        }
        let id = tables.next_id();
        let registered = RegisteredProvider {
            id: ProviderId(id),
            name: provider.name.clone(),
            access_token: token.clone(),
            registered_at: Utc::now(),
        };
        tables.providers.push(registered.clone());
        Ok(registered)
    }

    async fn fetch_provider(&self, name: &str) -> StoreResult<Option<RegisteredProvider>> {
        Ok(self
            .tables()
            .providers
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }
}

#[async_trait]
impl PartitionStore for MemoryStore {
    async fn insert_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<RegisteredPartition> {
        let mut tables = self.tables();
        let duplicate = tables.partitions.iter().any(|p| {
            p.source_id == source
                && p.provider_id == provider
                && p.start == window.start
                && p.end == window.end
        });
        if duplicate {
            return Err(StoreError::Duplicate("partition already exists".into()));
        }
        let id = tables.next_id();
        let registered = RegisteredPartition {
            id: PartitionId(id),
            start: window.start,
            end: window.end,
            source_id: source,
            provider_id: provider,
            registered_at: Utc::now(),
        };
        tables.partitions.push(registered.clone());
        Ok(registered)
    }

    async fn fetch_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<Option<RegisteredPartition>> {
        Ok(self
            .tables()
            .partitions
            .iter()
            .find(|p| {
                p.source_id == source
                    && p.provider_id == provider
                    && p.start == window.start
                    && p.end == window.end
            })
            .cloned())
    }

    async fn partitions_intersecting(
        &self,
        source: SourceId,
        window: Window,
    ) -> StoreResult<Vec<RegisteredPartition>> {
        let mut found: Vec<RegisteredPartition> = self
            .tables()
            .partitions
            .iter()
            .filter(|p| p.source_id == source && p.window().intersects(&window))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.start);
        Ok(found)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append_event(
        &self,
        partition: PartitionId,
        kind: EventKind,
    ) -> StoreResult<RegisteredEvent> {
        let event = RegisteredEvent {
            partition_id: partition,
            kind,
            registered_at: Utc::now(),
        };
        self.tables().events.push(event.clone());
        Ok(event)
    }

    async fn latest_events(
        &self,
        partitions: &[PartitionId],
    ) -> StoreResult<HashMap<PartitionId, RegisteredEvent>> {
        let tables = self.tables();
        let mut latest: HashMap<PartitionId, RegisteredEvent> = HashMap::new();
        for event in &tables.events {
            if !partitions.contains(&event.partition_id) {
                continue;
            }
            match latest.get(&event.partition_id) {
                // `>=` so that append order breaks clock ties, matching the
                // `id DESC` tie-break of the Postgres query.
                Some(current) if event.registered_at < current.registered_at => {}
                _ => {
                    latest.insert(event.partition_id, event.clone());
                }
            }
        }
        Ok(latest)
    }
}
