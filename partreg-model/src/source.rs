use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::SourceId;
use crate::token::AccessToken;

/// A source registration request, before the registry has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub owner: String,
}

impl Source {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
        }
    }

    /// Names and owners are keys: non-empty, no embedded whitespace.
    pub fn validate(&self) -> Result<()> {
        validate_name("source name", &self.name)?;
        validate_name("source owner", &self.owner)
    }
}

/// A source accepted by the registry, carrying its issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSource {
    pub id: SourceId,
    pub name: String,
    pub owner: String,
    pub access_token: AccessToken,
    pub registered_at: DateTime<Utc>,
}

pub(crate) fn validate_name(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ModelError::Validation(format!("{what} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation(format!(
            "{what} must not contain whitespace: {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_passes() {
        assert!(Source::new("sales.orders", "data-team").validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(Source::new("", "data-team").validate().is_err());
    }

    #[test]
    fn whitespace_in_name_is_rejected() {
        assert!(Source::new("has space", "data-team").validate().is_err());
        assert!(Source::new("has\ttab", "data-team").validate().is_err());
    }

    #[test]
    fn whitespace_in_owner_is_rejected() {
        assert!(Source::new("orders", "data team").validate().is_err());
    }
}
