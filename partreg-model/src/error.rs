use thiserror::Error;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unparseable timestamp: {0}")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
