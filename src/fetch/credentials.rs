//! Bearer credential for the timeline API.

use std::fmt;

use super::FetchError;

/// Environment variable holding the bearer token.
pub const BEARER_TOKEN_ENV: &str = "BEARER_TOKEN";

/// API credential, resolved once at startup and handed to the client.
///
/// `Debug` output never includes the token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    bearer_token: String,
}

impl ApiCredentials {
    /// Wraps an explicit bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingCredential`] when the token is blank.
    pub fn new(bearer_token: impl Into<String>) -> Result<Self, FetchError> {
        let bearer_token = bearer_token.into().trim().to_string();
        if bearer_token.is_empty() {
            return Err(FetchError::MissingCredential {
                variable: BEARER_TOKEN_ENV,
            });
        }
        Ok(Self { bearer_token })
    }

    /// Reads the token from [`BEARER_TOKEN_ENV`].
    ///
    /// Loading a `.env` file is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingCredential`] when the variable is unset or blank.
    pub fn from_env() -> Result<Self, FetchError> {
        let value = std::env::var(BEARER_TOKEN_ENV).unwrap_or_default();
        Self::new(value)
    }

    pub(crate) fn bearer_token(&self) -> &str {
        &self.bearer_token
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_trim_token() {
        let creds = ApiCredentials::new("  abc123\n").unwrap();
        assert_eq!(creds.bearer_token(), "abc123");
    }

    #[test]
    fn test_credentials_reject_blank_token() {
        let err = ApiCredentials::new("   ").unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingCredential {
                variable: BEARER_TOKEN_ENV
            }
        ));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = ApiCredentials::new("super-secret-token").unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("redacted"));
    }
}
