use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque bearer credential binding a provider's authority to act on a
/// source. Compared only by equality; not a signed credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Generate a fresh random token. UUID-class randomness is all the
    /// service promises; the token is not a cryptographic secret.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// Tokens stay out of logs and debug dumps.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(AccessToken::generate(), AccessToken::generate());
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = AccessToken::new("very-secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(AccessToken::new("t"), AccessToken::new("t"));
        assert_ne!(AccessToken::new("t"), AccessToken::new("u"));
    }
}
