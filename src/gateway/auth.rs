//! Gateway Authentication
//!
//! The gateway authenticates API callers with a bearer token. Tokens are
//! resolved from the CLI, the environment or the persisted config, and are
//! never written to logs.

use crate::error::{Error, Result};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "CDX_TOKEN";

/// Bearer token for the gateway
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Validate and wrap a raw token.
    /// Tokens must be non-empty printable ASCII without whitespace, since
    /// they travel verbatim in the Authorization header.
    pub fn new(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(Error::InvalidToken("token is empty".to_string()));
        }
        if !token.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidToken(
                "token contains whitespace or non-ASCII characters".to_string(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    /// Raw token for the Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Read the token from `CDX_TOKEN`, ignoring invalid values
    pub fn from_env() -> Option<Self> {
        let raw = std::env::var(TOKEN_ENV).ok()?;
        match Self::new(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", TOKEN_ENV, e);
                None
            }
        }
    }
}

// Security: never print the secret itself
impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiToken(***{} chars)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_trimmed() {
        let token = ApiToken::new("  abc.def-123 \n").unwrap();
        assert_eq!(token.expose(), "abc.def-123");
    }

    #[test]
    fn test_rejects_bad_tokens() {
        assert!(ApiToken::new("").is_err());
        assert!(ApiToken::new("two words").is_err());
        assert!(ApiToken::new("caf\u{e9}").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = ApiToken::new("super-secret").unwrap();
        assert!(!format!("{:?}", token).contains("super-secret"));
    }
}
