use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::ProviderId;
use crate::source::validate_name;
use crate::token::AccessToken;

/// A provider registration request. Unlike sources, providers bring their
/// own token; the registry only stores it for later comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("provider name", &self.name)
    }
}

/// A provider accepted by the registry.
///
/// A provider is not bound to one source; authorization is re-checked on
/// every partition and event operation by comparing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredProvider {
    pub id: ProviderId,
    pub name: String,
    pub access_token: AccessToken,
    pub registered_at: DateTime<Utc>,
}
