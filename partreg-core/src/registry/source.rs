use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use partreg_model::{AccessToken, RegisteredSource, Source};

use crate::error::{Registration, RegistryError, Result};
use crate::store::{SourceStore, StoreError};

/// Registers and looks up sources, issuing each source its access token.
///
/// The cache in front of the store is never evicted: sources are immutable
/// once created, so a cached entry can only ever be missing, never stale.
pub struct SourceRegistry {
    store: Arc<dyn SourceStore>,
    cache: DashMap<String, RegisteredSource>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl SourceRegistry {
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Validate, generate a token, and persist. The pre-insert lookup is a
    /// fast path only; the store's uniqueness constraint decides duplicate
    /// registration under concurrent callers.
    pub async fn register(&self, source: Source) -> Result<Registration<RegisteredSource>> {
        source.validate()?;

        if let Some(existing) = self.lookup_opt(&source.name).await? {
            return Ok(Registration::Existing(existing));
        }

        let token = AccessToken::generate();
        match self.store.insert_source(&source, &token).await {
            Ok(registered) => {
                info!(source = %registered.name, "registered source");
                self.cache.insert(registered.name.clone(), registered.clone());
                Ok(Registration::Created(registered))
            }
            Err(StoreError::Duplicate(_)) => {
                // Lost a race with another caller; hand back their row.
                let existing = self.store.fetch_source(&source.name).await?.ok_or_else(|| {
                    RegistryError::Persist(format!(
                        "source <{}> vanished after duplicate insert",
                        source.name
                    ))
                })?;
                self.cache.insert(existing.name.clone(), existing.clone());
                Ok(Registration::Existing(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn lookup(&self, name: &str) -> Result<RegisteredSource> {
        self.lookup_opt(name).await?.ok_or_else(|| {
            RegistryError::NotFound(format!("source <{name}> is not registered"))
        })
    }

    pub async fn lookup_opt(&self, name: &str) -> Result<Option<RegisteredSource>> {
        if let Some(hit) = self.cache.get(name) {
            debug!(source = name, "source cache hit");
            return Ok(Some(hit.clone()));
        }
        let fetched = self.store.fetch_source(name).await?;
        if let Some(source) = &fetched {
            debug!(source = name, "source cache miss, populated from store");
            self.cache.insert(source.name.clone(), source.clone());
        }
        Ok(fetched)
    }
}
