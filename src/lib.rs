//! x2pdf Core Library
//!
//! This library provides the core functionality for the x2pdf tool, which
//! fetches an account's recent posts, sorts them into topics, and renders
//! them into a PDF document.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Timeline API client (user lookup and recent posts)
//! - [`cache`] - JSON post cache shared between fetch and export runs
//! - [`categorize`] - Ordered keyword rule table and post grouping
//! - [`normalize`] - Text sanitization for the PDF renderer
//! - [`export`] - Page canvas and PDF exporter
//! - [`pipeline`] - Fetch, group, and export in one pass

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod categorize;
pub mod export;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
mod post;
mod user_agent;

// Re-export commonly used types
pub use cache::{CacheError, CacheMode, DEFAULT_CACHE_PATH, load_posts, save_posts};
pub use categorize::{CategoryLabel, CategoryRule, Grouping, categorize, group, rules};
pub use export::{
    DEFAULT_OUTPUT_PATH, EmbeddedFonts, ExportError, ExportOptions, ExportSummary, FontError,
    PdfExporter, RenderedDocument,
};
pub use fetch::{
    ApiCredentials, DEFAULT_API_BASE_URL, DEFAULT_MAX_RESULTS, FetchError, PostSource,
    TimelineClient,
};
pub use normalize::{WRAP_CHUNK, force_wrap_long_tokens, normalize_text};
pub use pipeline::{
    PipelineError, PipelineOptions, PipelineReport, PostOrigin, category_counts, export_from_cache,
    fetch_to_cache, run_pipeline,
};
pub use post::Post;
