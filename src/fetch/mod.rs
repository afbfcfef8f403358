//! Fetching posts from the timeline API.
//!
//! # Architecture
//!
//! - [`PostSource`] - Async trait the pipeline fetches through
//! - [`TimelineClient`] - HTTP implementation (username lookup, then recent posts)
//! - [`ApiCredentials`] - Bearer token, resolved once and injected into the client
//! - [`FetchError`] - Structured failures; nothing is retried
//!
//! # Example
//!
//! ```no_run
//! use x2pdf_core::fetch::{ApiCredentials, PostSource, TimelineClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TimelineClient::new(ApiCredentials::from_env()?)?;
//! let posts = client.recent_posts("rustlang", 10).await?;
//! println!("fetched {} posts", posts.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod credentials;
mod error;
mod http_client;

pub use client::TimelineClient;
pub use credentials::{ApiCredentials, BEARER_TOKEN_ENV};
pub use error::FetchError;
pub use http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpTimeouts};

use std::ops::RangeInclusive;

use async_trait::async_trait;

use crate::post::Post;

/// Public API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";

/// Posts requested per run when nothing else is configured.
pub const DEFAULT_MAX_RESULTS: u8 = 5;

/// Page sizes the timeline endpoint accepts.
pub const MAX_RESULTS_RANGE: RangeInclusive<u8> = 5..=100;

/// Anything that can produce an account's recent posts.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Returns up to `max_results` recent posts of `username`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the posts cannot be retrieved.
    async fn recent_posts(&self, username: &str, max_results: u8)
    -> Result<Vec<Post>, FetchError>;
}
