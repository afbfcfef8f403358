//! Error types for the post cache.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the post cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File system error reading or writing the cache.
    #[error("IO error on cache file {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not a JSON array of posts.
    #[error("invalid cache file {path}: {source}")]
    Json {
        /// The cache file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Unrecognized cache mode label.
    #[error("unknown cache mode '{value}': expected one of refresh, reuse, off")]
    UnknownMode {
        /// The rejected label.
        value: String,
    },
}

impl CacheError {
    /// Returns `true` when the cache file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
