//! The post record shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// One fetched post: a timestamp and a text body.
///
/// Field names on the wire follow the timeline API (`created_at`, `text`),
/// and the cache file uses the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Creation timestamp exactly as the API reported it.
    #[serde(rename = "created_at", default)]
    pub timestamp: String,
    /// Post text.
    #[serde(rename = "text")]
    pub body: String,
}

impl Post {
    /// Creates a post from a timestamp and body.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            body: body.into(),
        }
    }
}
