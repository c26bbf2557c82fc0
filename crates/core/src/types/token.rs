//! Bearer token issued by the backend on login.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing an [`AuthToken`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token string is empty or whitespace.
    #[error("token cannot be empty")]
    Empty,
}

/// An opaque, non-empty bearer token.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

impl AuthToken {
    /// Parse a token, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Empty` if the value is empty or only whitespace.
    pub fn parse(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(value))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl TryFrom<String> for AuthToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AuthToken> for String {
    fn from(token: AuthToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(AuthToken::parse(""), Err(TokenError::Empty));
        assert_eq!(AuthToken::parse("   "), Err(TokenError::Empty));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = AuthToken::parse("t1-secret").expect("valid token");
        assert!(!format!("{token:?}").contains("t1-secret"));
        assert_eq!(token.expose(), "t1-secret");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<AuthToken>("\"\"").is_err());
        let token: AuthToken = serde_json::from_str("\"t1\"").expect("valid");
        assert_eq!(token.expose(), "t1");
    }
}
