//! Registry and readiness engine for the partition registry service.
//!
//! The service tracks, for named data sources fed by providers, which time
//! partitions exist and whether they are currently safe to read. Producers
//! register partitions and mark them LOCKED while writing and UNLOCKED when
//! complete; consumers ask whether an interval of a source is ready.
//!
//! This crate is the coordination core: entity registries with two-tier
//! (memory-then-store) lookup, token-based authorization between providers
//! and sources, the append-only event log, and the interval-coverage
//! readiness check. The HTTP boundary lives in `partreg-server`.

pub mod error;
pub mod readiness;
pub mod registry;
pub mod store;

pub use error::{Registration, RegistryError, Result};
pub use readiness::{GapScan, IntervalCut, PartitionState, Readiness, ReadinessStrategy};
pub use registry::RegistryService;
pub use store::{RegistryStores, StoreError, memory::MemoryStore, postgres::PostgresStore};
