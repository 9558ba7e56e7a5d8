use serde::Serialize;
use thiserror::Error;

use partreg_model::ModelError;

use crate::store::StoreError;

/// Failure kinds for registry operations. No exception-style control flow:
/// every operation returns one of these or its tagged success value.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed name, owner, or interval. Recoverable by resubmitting
    /// corrected input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced source, provider, or partition does not exist.
    /// Recoverable by registering the missing entity first.
    #[error("{0}")]
    NotFound(String),

    /// Provider token does not match the source token.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The persistent store rejected or failed a write. Never retried here;
    /// retry policy belongs to the store or the caller.
    #[error("persist failed: {0}")]
    Persist(String),
}

impl From<ModelError> for RegistryError {
    fn from(err: ModelError) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        // Duplicates are handled where they carry meaning (registration);
        // one that escapes to here is a persistence failure.
        RegistryError::Persist(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Outcome of a registration attempt.
///
/// `Existing` is the idempotent branch: the entity was already registered
/// and nothing was written. It is reported distinctly from `Created` so the
/// boundary layer can surface it as a conflict while still handing the
/// caller the stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "entity")]
pub enum Registration<T> {
    Created(T),
    Existing(T),
}

impl<T> Registration<T> {
    pub fn entity(&self) -> &T {
        match self {
            Registration::Created(entity) | Registration::Existing(entity) => entity,
        }
    }

    pub fn into_entity(self) -> T {
        match self {
            Registration::Created(entity) | Registration::Existing(entity) => entity,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}
