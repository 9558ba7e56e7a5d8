//! Entity registries and the service facade.

mod event;
mod partition;
mod provider;
mod source;

pub use event::EventLog;
pub use partition::PartitionRegistry;
pub use provider::ProviderRegistry;
pub use source::SourceRegistry;

use tracing::debug;

use partreg_model::{
    AccessToken, EventKind, Provider, RegisteredEvent, RegisteredPartition, RegisteredProvider,
    RegisteredSource, Source, Window,
};

use crate::error::{Registration, RegistryError, Result};
use crate::readiness::{GapScan, PartitionState, Readiness, ReadinessStrategy};
use crate::store::RegistryStores;

/// Authorization between a provider and a source is a plain token match,
/// re-checked on every partition and event operation; providers are never
/// permanently bound to a source.
pub(crate) fn authorize(
    provider: &RegisteredProvider,
    source: &RegisteredSource,
) -> Result<()> {
    if provider.access_token != source.access_token {
        return Err(RegistryError::AccessDenied(format!(
            "provider <{}> has no access to source <{}>; ask <{}> for access",
            provider.name, source.name, source.owner
        )));
    }
    Ok(())
}

/// The coordination point between producers and consumers: owns the four
/// registries and the readiness strategy, all constructor-injected so
/// independent instances (one per process, one per test) share no state.
pub struct RegistryService {
    sources: SourceRegistry,
    providers: ProviderRegistry,
    partitions: PartitionRegistry,
    events: EventLog,
    strategy: Box<dyn ReadinessStrategy>,
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("sources", &self.sources)
            .field("providers", &self.providers)
            .field("partitions", &self.partitions)
            .finish_non_exhaustive()
    }
}

impl RegistryService {
    /// Service over the given stores with the canonical gap-scan strategy.
    pub fn new(stores: RegistryStores) -> Self {
        Self::with_strategy(stores, Box::new(GapScan))
    }

    pub fn with_strategy(stores: RegistryStores, strategy: Box<dyn ReadinessStrategy>) -> Self {
        Self {
            sources: SourceRegistry::new(stores.sources),
            providers: ProviderRegistry::new(stores.providers),
            partitions: PartitionRegistry::new(stores.partitions),
            events: EventLog::new(stores.events),
            strategy,
        }
    }

    pub async fn register_source(
        &self,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Registration<RegisteredSource>> {
        self.sources.register(Source::new(name, owner)).await
    }

    pub async fn register_provider(
        &self,
        name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Registration<RegisteredProvider>> {
        self.providers
            .register(Provider::new(name), AccessToken::new(access_token))
            .await
    }

    pub async fn lookup_source(&self, name: &str) -> Result<RegisteredSource> {
        self.sources.lookup(name).await
    }

    pub async fn lookup_provider(&self, name: &str) -> Result<RegisteredProvider> {
        self.providers.lookup(name).await
    }

    pub async fn register_partition(
        &self,
        source_name: &str,
        provider_name: &str,
        window: Window,
    ) -> Result<Registration<RegisteredPartition>> {
        window.validate()?;
        let source = self.sources.lookup(source_name).await?;
        let provider = self.providers.lookup(provider_name).await?;
        self.partitions.register(&source, &provider, window).await
    }

    pub async fn lock(
        &self,
        source_name: &str,
        provider_name: &str,
        window: Window,
    ) -> Result<RegisteredEvent> {
        self.signal(source_name, provider_name, window, EventKind::Lock)
            .await
    }

    pub async fn unlock(
        &self,
        source_name: &str,
        provider_name: &str,
        window: Window,
    ) -> Result<RegisteredEvent> {
        self.signal(source_name, provider_name, window, EventKind::Unlock)
            .await
    }

    async fn signal(
        &self,
        source_name: &str,
        provider_name: &str,
        window: Window,
        kind: EventKind,
    ) -> Result<RegisteredEvent> {
        window.validate()?;
        let source = self.sources.lookup(source_name).await?;
        let provider = self.providers.lookup(provider_name).await?;
        authorize(&provider, &source)?;
        let partition = self.partitions.lookup(&source, &provider, window).await?;
        self.events.append(&partition, kind).await
    }

    /// Pure query over current registry and event-log state; never mutates
    /// and never caches its verdict.
    pub async fn check_readiness(&self, source_name: &str, window: Window) -> Result<Readiness> {
        window.validate()?;

        let Some(source) = self.sources.lookup_opt(source_name).await? else {
            return Ok(Readiness::not_ready(format!(
                "source <{source_name}> is not registered"
            )));
        };

        let candidates = self.partitions.intersecting(source.id, window).await?;
        if candidates.is_empty() {
            return Ok(Readiness::not_ready(format!(
                "no partitions registered for source <{}> within {}",
                source.name, window
            )));
        }

        let last_events = self.events.latest_events(&candidates).await?;
        if last_events.is_empty() {
            return Ok(Readiness::not_ready(format!(
                "no events registered for source <{}> within {}",
                source.name, window
            )));
        }

        let states: Vec<PartitionState> = candidates
            .iter()
            .map(|p| PartitionState {
                id: p.id,
                window: p.window(),
                last_event: last_events.get(&p.id).cloned(),
            })
            .collect();

        let verdict = self.strategy.evaluate(window, &states);
        debug!(
            source = source_name,
            %window,
            ready = verdict.is_ready(),
            "readiness evaluated"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::store::memory::MemoryStore;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, day, 0, 0, 0).unwrap()
    }

    fn window(start_day: u32, end_day: u32) -> Window {
        Window::new(at(start_day), at(end_day))
    }

    fn service() -> RegistryService {
        RegistryService::new(MemoryStore::shared().stores())
    }

    /// Register a source and a provider sharing the source's token.
    async fn source_with_provider(
        service: &RegistryService,
        source: &str,
        provider: &str,
    ) -> RegisteredSource {
        let registered = service
            .register_source(source, "data-team")
            .await
            .unwrap()
            .into_entity();
        service
            .register_provider(provider, registered.access_token.as_str())
            .await
            .unwrap();
        registered
    }

    #[tokio::test]
    async fn source_registration_is_idempotent_by_name() {
        let service = service();
        let first = service.register_source("orders", "data-team").await.unwrap();
        assert!(first.is_created());

        let second = service.register_source("orders", "someone-else").await.unwrap();
        assert!(!second.is_created());
        assert_eq!(second.entity(), first.entity());
    }

    #[tokio::test]
    async fn invalid_source_names_fail_validation() {
        let service = service();
        for name in ["", "has space"] {
            let err = service.register_source(name, "data-team").await.unwrap_err();
            assert!(matches!(err, RegistryError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn lookup_returns_what_register_returned_on_both_cache_paths() {
        let store = MemoryStore::shared();
        let service = RegistryService::new(store.stores());
        let registered = service
            .register_source("orders", "data-team")
            .await
            .unwrap()
            .into_entity();

        // Warm path through the registering instance...
        assert_eq!(service.lookup_source("orders").await.unwrap(), registered);

        // ...and a cold cache over the same store.
        let cold = RegistryService::new(store.stores());
        assert_eq!(cold.lookup_source("orders").await.unwrap(), registered);
    }

    #[tokio::test]
    async fn duplicate_insert_race_resolves_to_existing() {
        let store = MemoryStore::shared();
        let first = RegistryService::new(store.stores());
        let second = RegistryService::new(store.stores());

        // Both instances believe the name is free; the second insert hits
        // the store's uniqueness check.
        let created = first.register_source("orders", "data-team").await.unwrap();
        let raced = second.register_source("orders", "data-team").await.unwrap();
        assert!(created.is_created());
        assert!(!raced.is_created());
        assert_eq!(raced.entity(), created.entity());
    }

    #[tokio::test]
    async fn partition_registration_requires_matching_tokens() {
        let service = service();
        source_with_provider(&service, "orders", "good-etl").await;
        service
            .register_provider("rogue-etl", "some-other-token")
            .await
            .unwrap();

        let err = service
            .register_partition("orders", "rogue-etl", window(1, 10))
            .await
            .unwrap_err();
        match err {
            RegistryError::AccessDenied(msg) => {
                assert!(msg.contains("data-team"), "message should name the owner: {msg}");
            }
            other => panic!("expected AccessDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn partition_registration_rejects_bad_windows() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;

        for bad in [window(10, 10), window(10, 1)] {
            let err = service
                .register_partition("orders", "etl", bad)
                .await
                .unwrap_err();
            assert!(matches!(err, RegistryError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn window_validation_precedes_name_resolution() {
        let service = service();

        // Inverted window under a source that was never registered: the
        // window is judged first, so this is a validation failure rather
        // than a failed lookup.
        let err = service
            .register_partition("ghost", "etl", window(10, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn partition_registration_against_unknown_entities_fails_lookup() {
        let service = service();
        let err = service
            .register_partition("ghost", "etl", window(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_partition_is_reported_as_existing() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;

        let first = service
            .register_partition("orders", "etl", window(1, 10))
            .await
            .unwrap();
        let second = service
            .register_partition("orders", "etl", window(1, 10))
            .await
            .unwrap();
        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(second.entity(), first.entity());
    }

    #[tokio::test]
    async fn locking_requires_a_registered_partition() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;

        let err = service.lock("orders", "etl", window(1, 10)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn unlocked_partition_covering_the_window_is_ready() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;
        service
            .register_partition("orders", "etl", window(1, 10))
            .await
            .unwrap();
        service.unlock("orders", "etl", window(1, 10)).await.unwrap();

        let verdict = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(verdict.is_ready());
    }

    #[tokio::test]
    async fn last_event_wins_lock_then_unlock() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;
        service
            .register_partition("orders", "etl", window(1, 10))
            .await
            .unwrap();

        service.lock("orders", "etl", window(1, 10)).await.unwrap();
        let locked = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(locked.reason().unwrap().contains("locked by partition"));

        service.unlock("orders", "etl", window(1, 10)).await.unwrap();
        let unlocked = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(unlocked.is_ready());
    }

    #[tokio::test]
    async fn readiness_reports_gaps_between_partitions() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;
        for w in [window(1, 5), window(6, 10)] {
            service.register_partition("orders", "etl", w).await.unwrap();
            service.unlock("orders", "etl", w).await.unwrap();
        }

        let verdict = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(verdict.reason().unwrap().contains("gap between"));
    }

    #[tokio::test]
    async fn overlapping_unlocked_partitions_are_ready() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;
        for w in [window(1, 7), window(5, 10)] {
            service.register_partition("orders", "etl", w).await.unwrap();
            service.unlock("orders", "etl", w).await.unwrap();
        }

        let verdict = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(verdict.is_ready());
    }

    #[tokio::test]
    async fn readiness_of_unknown_or_empty_sources_is_not_an_error() {
        let service = service();
        let verdict = service.check_readiness("ghost", window(1, 10)).await.unwrap();
        assert!(verdict.reason().unwrap().contains("is not registered"));

        source_with_provider(&service, "orders", "etl").await;
        let verdict = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(verdict.reason().unwrap().contains("no partitions registered"));
    }

    #[tokio::test]
    async fn registered_but_eventless_partitions_are_not_ready() {
        let service = service();
        source_with_provider(&service, "orders", "etl").await;
        service
            .register_partition("orders", "etl", window(1, 10))
            .await
            .unwrap();

        let verdict = service.check_readiness("orders", window(1, 10)).await.unwrap();
        assert!(verdict.reason().unwrap().contains("no events registered"));
    }
}
