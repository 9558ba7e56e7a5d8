use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use partreg_model::{AccessToken, Provider, RegisteredProvider};

use crate::error::{Registration, RegistryError, Result};
use crate::store::{ProviderStore, StoreError};

/// Registers and looks up providers. Same shape as the source registry,
/// except the caller supplies the token instead of the registry minting it.
pub struct ProviderRegistry {
    store: Arc<dyn ProviderStore>,
    cache: DashMap<String, RegisteredProvider>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    pub async fn register(
        &self,
        provider: Provider,
        token: AccessToken,
    ) -> Result<Registration<RegisteredProvider>> {
        provider.validate()?;

        if let Some(existing) = self.lookup_opt(&provider.name).await? {
            return Ok(Registration::Existing(existing));
        }

        match self.store.insert_provider(&provider, &token).await {
            Ok(registered) => {
                info!(provider = %registered.name, "registered provider");
                self.cache.insert(registered.name.clone(), registered.clone());
                Ok(Registration::Created(registered))
            }
            Err(StoreError::Duplicate(_)) => {
                let existing =
                    self.store.fetch_provider(&provider.name).await?.ok_or_else(|| {
                        RegistryError::Persist(format!(
                            "provider <{}> vanished after duplicate insert",
                            provider.name
                        ))
                    })?;
                self.cache.insert(existing.name.clone(), existing.clone());
                Ok(Registration::Existing(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn lookup(&self, name: &str) -> Result<RegisteredProvider> {
        self.lookup_opt(name).await?.ok_or_else(|| {
            RegistryError::NotFound(format!("provider <{name}> is not registered"))
        })
    }

    pub async fn lookup_opt(&self, name: &str) -> Result<Option<RegisteredProvider>> {
        if let Some(hit) = self.cache.get(name) {
            debug!(provider = name, "provider cache hit");
            return Ok(Some(hit.clone()));
        }
        let fetched = self.store.fetch_provider(name).await?;
        if let Some(provider) = &fetched {
            debug!(provider = name, "provider cache miss, populated from store");
            self.cache.insert(provider.name.clone(), provider.clone());
        }
        Ok(fetched)
    }
}
