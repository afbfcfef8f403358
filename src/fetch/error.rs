//! Error types for the fetch module.

use thiserror::Error;

/// Errors that can occur while talking to the timeline API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No bearer token was configured.
    #[error(
        "missing API credential: set {variable} in the environment or a .env file\n  Suggestion: create a bearer token in the developer portal"
    )]
    MissingCredential {
        /// Environment variable that was checked.
        variable: &'static str,
    },

    /// The username cannot be used in a lookup request.
    #[error("invalid username '{username}': {reason}")]
    InvalidUsername {
        /// The rejected username.
        username: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The configured API base URL is unusable.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// HTTP client construction failed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Description of the failure.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The API rejected the bearer token.
    #[error(
        "[AUTH] API rejected the credential (HTTP {status}) requesting {url}\n  Suggestion: check that BEARER_TOKEN is valid and has read access"
    )]
    Unauthorized {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code (401 or 403).
        status: u16,
    },

    /// Any other non-success HTTP response.
    #[error("HTTP {status} requesting {url}: {body}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The user lookup succeeded but returned no account.
    #[error("no account found for username '{username}'")]
    UserNotFound {
        /// The username that was looked up.
        username: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, classifying timeouts.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an error for a non-success HTTP status.
    pub fn from_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let url = url.into();
        if matches!(status, 401 | 403) {
            return Self::Unauthorized { url, status };
        }
        Self::HttpStatus {
            url,
            status,
            body: truncate_body(body),
        }
    }

    /// Returns `true` for errors caused by the credential.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Unauthorized { .. }
        )
    }
}

const MAX_BODY_CHARS: usize = 200;

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_BODY_CHARS).collect();
    out.push_str("...");
    out
}
