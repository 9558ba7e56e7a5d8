//! PostgreSQL-backed implementation of the store ports.
//!
//! Uses the runtime query API throughout; row timestamps come from the
//! database clock (`now()` defaults in the schema), which is the single
//! shared time source event ordering relies on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use partreg_model::{
    AccessToken, EventKind, PartitionId, Provider, ProviderId, RegisteredEvent,
    RegisteredPartition, RegisteredProvider, RegisteredSource, Source, SourceId, Window,
};

use super::{
    EventStore, PartitionStore, ProviderStore, RegistryStores, SourceStore, StoreError,
    StoreResult,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .test_before_acquire(true)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("database connection failed: {e}")))?;

        info!(max_connections, "database pool initialized");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Port handles for building a registry service over this store.
    pub fn stores(&self) -> RegistryStores {
        RegistryStores {
            sources: Arc::new(self.clone()),
            providers: Arc::new(self.clone()),
            partitions: Arc::new(self.clone()),
            events: Arc::new(self.clone()),
        }
    }
}

fn map_insert_error(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return StoreError::Duplicate(format!("{what} already exists"));
    }
    StoreError::Backend(format!("failed to insert {what}: {err}"))
}

fn map_fetch_error(err: sqlx::Error, what: &str) -> StoreError {
    StoreError::Backend(format!("failed to fetch {what}: {err}"))
}

#[derive(sqlx::FromRow)]
struct SourceRow {
    id: i64,
    name: String,
    owner: String,
    access_token: String,
    registered_at: DateTime<Utc>,
}

impl From<SourceRow> for RegisteredSource {
    fn from(row: SourceRow) -> Self {
        RegisteredSource {
            id: SourceId(row.id),
            name: row.name,
            owner: row.owner,
            access_token: AccessToken::from(row.access_token),
            registered_at: row.registered_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: i64,
    name: String,
    access_token: String,
    registered_at: DateTime<Utc>,
}

impl From<ProviderRow> for RegisteredProvider {
    fn from(row: ProviderRow) -> Self {
        RegisteredProvider {
            id: ProviderId(row.id),
            name: row.name,
            access_token: AccessToken::from(row.access_token),
            registered_at: row.registered_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PartitionRow {
    id: i64,
    source_id: i64,
    provider_id: i64,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    registered_at: DateTime<Utc>,
}

impl From<PartitionRow> for RegisteredPartition {
    fn from(row: PartitionRow) -> Self {
        RegisteredPartition {
            id: PartitionId(row.id),
            start: row.start_at,
            end: row.end_at,
            source_id: SourceId(row.source_id),
            provider_id: ProviderId(row.provider_id),
            registered_at: row.registered_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    partition_id: i64,
    event_type: String,
    registered_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> StoreResult<RegisteredEvent> {
        let kind = EventKind::parse(&self.event_type).ok_or_else(|| {
            StoreError::Backend(format!("unexpected event type in store: {}", self.event_type))
        })?;
        Ok(RegisteredEvent {
            partition_id: PartitionId(self.partition_id),
            kind,
            registered_at: self.registered_at,
        })
    }
}

#[async_trait]
impl SourceStore for PostgresStore {
    async fn insert_source(
        &self,
        source: &Source,
        token: &AccessToken,
    ) -> StoreResult<RegisteredSource> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            INSERT INTO sources (name, owner, access_token)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner, access_token, registered_at
            "#,
        )
        .bind(&source.name)
        .bind(&source.owner)
        .bind(token.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "source"))?;

        Ok(row.into())
    }

    async fn fetch_source(&self, name: &str) -> StoreResult<Option<RegisteredSource>> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT id, name, owner, access_token, registered_at
            FROM sources
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_fetch_error(e, "source"))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl ProviderStore for PostgresStore {
    async fn insert_provider(
        &self,
        provider: &Provider,
        token: &AccessToken,
    ) -> StoreResult<RegisteredProvider> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            INSERT INTO providers (name, access_token)
            VALUES ($1, $2)
            RETURNING id, name, access_token, registered_at
            "#,
        )
        .bind(&provider.name)
        .bind(token.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "provider"))?;

        Ok(row.into())
    }

    async fn fetch_provider(&self, name: &str) -> StoreResult<Option<RegisteredProvider>> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, name, access_token, registered_at
            FROM providers
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_fetch_error(e, "provider"))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl PartitionStore for PostgresStore {
    async fn insert_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<RegisteredPartition> {
        let row = sqlx::query_as::<_, PartitionRow>(
            r#"
            INSERT INTO partitions (source_id, provider_id, start_at, end_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, source_id, provider_id, start_at, end_at, registered_at
            "#,
        )
        .bind(source.as_i64())
        .bind(provider.as_i64())
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "partition"))?;

        Ok(row.into())
    }

    async fn fetch_partition(
        &self,
        source: SourceId,
        provider: ProviderId,
        window: Window,
    ) -> StoreResult<Option<RegisteredPartition>> {
        let row = sqlx::query_as::<_, PartitionRow>(
            r#"
            SELECT id, source_id, provider_id, start_at, end_at, registered_at
            FROM partitions
            WHERE source_id = $1
              AND provider_id = $2
              AND start_at = $3
              AND end_at = $4
            "#,
        )
        .bind(source.as_i64())
        .bind(provider.as_i64())
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_fetch_error(e, "partition"))?;

        Ok(row.map(Into::into))
    }

    async fn partitions_intersecting(
        &self,
        source: SourceId,
        window: Window,
    ) -> StoreResult<Vec<RegisteredPartition>> {
        // Symmetric half-open intersection: start_at < end AND start < end_at.
        let rows = sqlx::query_as::<_, PartitionRow>(
            r#"
            SELECT id, source_id, provider_id, start_at, end_at, registered_at
            FROM partitions
            WHERE source_id = $1
              AND start_at < $3
              AND $2 < end_at
            ORDER BY start_at
            "#,
        )
        .bind(source.as_i64())
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_fetch_error(e, "partitions"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn append_event(
        &self,
        partition: PartitionId,
        kind: EventKind,
    ) -> StoreResult<RegisteredEvent> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO partition_events (partition_id, event_type)
            VALUES ($1, $2)
            RETURNING partition_id, event_type, registered_at
            "#,
        )
        .bind(partition.as_i64())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "event"))?;

        row.into_event()
    }

    async fn latest_events(
        &self,
        partitions: &[PartitionId],
    ) -> StoreResult<HashMap<PartitionId, RegisteredEvent>> {
        if partitions.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = partitions.iter().map(PartitionId::as_i64).collect();
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT DISTINCT ON (partition_id)
                partition_id, event_type, registered_at
            FROM partition_events
            WHERE partition_id = ANY($1)
            ORDER BY partition_id, registered_at DESC, id DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_fetch_error(e, "events"))?;

        let mut latest = HashMap::with_capacity(rows.len());
        for row in rows {
            let event = row.into_event()?;
            latest.insert(event.partition_id, event);
        }
        Ok(latest)
    }
}
