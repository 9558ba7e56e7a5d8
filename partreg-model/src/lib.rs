//! Core data model definitions shared across partition registry crates.

pub mod error;
pub mod event;
pub mod ids;
pub mod partition;
pub mod provider;
pub mod source;
pub mod timestamp;
pub mod token;

pub use error::{ModelError, Result as ModelResult};
pub use event::{EventKind, RegisteredEvent};
pub use ids::{PartitionId, ProviderId, SourceId};
pub use partition::{RegisteredPartition, Window};
pub use provider::{Provider, RegisteredProvider};
pub use source::{RegisteredSource, Source};
pub use timestamp::{coerce_utc, parse_timestamp};
pub use token::AccessToken;
