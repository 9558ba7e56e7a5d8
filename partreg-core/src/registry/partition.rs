use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use partreg_model::{
    ProviderId, RegisteredPartition, RegisteredProvider, RegisteredSource, SourceId, Window,
};

use crate::error::{Registration, RegistryError, Result};
use crate::registry::authorize;
use crate::store::{PartitionStore, StoreError};

type WindowKey = (SourceId, ProviderId, DateTime<Utc>, DateTime<Utc>);

/// Registers time partitions under a (source, provider) pair, gated by the
/// token match between the two.
pub struct PartitionRegistry {
    store: Arc<dyn PartitionStore>,
    cache: DashMap<WindowKey, RegisteredPartition>,
}

impl std::fmt::Debug for PartitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionRegistry")
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn key(source: SourceId, provider: ProviderId, window: Window) -> WindowKey {
    (source, provider, window.start, window.end)
}

impl PartitionRegistry {
    pub fn new(store: Arc<dyn PartitionStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    pub async fn register(
        &self,
        source: &RegisteredSource,
        provider: &RegisteredProvider,
        window: Window,
    ) -> Result<Registration<RegisteredPartition>> {
        window.validate()?;
        authorize(provider, source)?;

        if let Some(existing) = self.lookup_opt(source.id, provider.id, window).await? {
            return Ok(Registration::Existing(existing));
        }

        match self.store.insert_partition(source.id, provider.id, window).await {
            Ok(registered) => {
                info!(
                    source = %source.name,
                    provider = %provider.name,
                    window = %window,
                    partition = %registered.id,
                    "registered partition"
                );
                self.cache
                    .insert(key(source.id, provider.id, window), registered.clone());
                Ok(Registration::Created(registered))
            }
            Err(StoreError::Duplicate(_)) => {
                let existing = self
                    .store
                    .fetch_partition(source.id, provider.id, window)
                    .await?
                    .ok_or_else(|| {
                        RegistryError::Persist(format!(
                            "partition {window} vanished after duplicate insert"
                        ))
                    })?;
                self.cache
                    .insert(key(source.id, provider.id, window), existing.clone());
                Ok(Registration::Existing(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The partition registered under (source, provider) with exactly this
    /// window, or `NotFound`.
    pub async fn lookup(
        &self,
        source: &RegisteredSource,
        provider: &RegisteredProvider,
        window: Window,
    ) -> Result<RegisteredPartition> {
        self.lookup_opt(source.id, provider.id, window)
            .await?
            .ok_or_else(|| {
                RegistryError::NotFound(format!(
                    "partition {window} is not registered for source <{}> and provider <{}>",
                    source.name, provider.name
                ))
            })
    }

    async fn lookup_opt(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> Result<Option<RegisteredPartition>> {
        if let Some(hit) = self.cache.get(&key(source, provider, window)) {
            debug!(%window, "partition cache hit");
            return Ok(Some(hit.clone()));
        }
        let fetched = self.store.fetch_partition(source, provider, window).await?;
        if let Some(partition) = &fetched {
            self.cache
                .insert(key(source, provider, window), partition.clone());
        }
        Ok(fetched)
    }

    /// Range scan: every partition of `source` intersecting `window`.
    /// Always served by the store's range index, never the cache.
    pub async fn intersecting(
        &self,
        source: SourceId,
        window: Window,
    ) -> Result<Vec<RegisteredPartition>> {
        Ok(self.store.partitions_intersecting(source, window).await?)
    }
}
