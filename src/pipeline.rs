//! Fetch, group, and export in one pass.
//!
//! The pipeline decides where posts come from according to the
//! [`CacheMode`], keeps the cache up to date, then hands the grouping to the
//! [`PdfExporter`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cache::{self, CacheError, CacheMode};
use crate::categorize::{CategoryLabel, Grouping, group};
use crate::export::{ExportError, ExportOptions, ExportSummary, PdfExporter};
use crate::fetch::{DEFAULT_MAX_RESULTS, FetchError, PostSource};
use crate::post::Post;

/// Errors from any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetching posts failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading or writing the post cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Rendering or writing the document failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Where a run's posts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrigin {
    /// Retrieved from the API during this run.
    Fetched,
    /// Read from the cache file.
    Cache,
}

impl PostOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetched => "api",
            Self::Cache => "cache",
        }
    }
}

/// Settings for a full run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Account whose posts are exported.
    pub username: String,
    /// Posts requested from the API.
    pub max_results: u8,
    /// Cache file location.
    pub cache_path: PathBuf,
    /// How the cache is used.
    pub cache_mode: CacheMode,
    /// Exporter settings.
    pub export: ExportOptions,
}

impl PipelineOptions {
    /// Options for `username` with every other setting at its default.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            max_results: DEFAULT_MAX_RESULTS,
            cache_path: PathBuf::from(cache::DEFAULT_CACHE_PATH),
            cache_mode: CacheMode::default(),
            export: ExportOptions::default(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Where the posts came from.
    pub origin: PostOrigin,
    /// Posts per category, in section order.
    pub counts: Vec<(CategoryLabel, usize)>,
    /// What the exporter wrote.
    pub summary: ExportSummary,
}

impl PipelineReport {
    fn new(origin: PostOrigin, grouping: &Grouping, summary: ExportSummary) -> Self {
        Self {
            origin,
            counts: category_counts(grouping),
            summary,
        }
    }

    /// Total number of exported posts.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

/// Posts per category, in the grouping's iteration order.
#[must_use]
pub fn category_counts(grouping: &Grouping) -> Vec<(CategoryLabel, usize)> {
    grouping
        .iter()
        .map(|(label, posts)| (label, posts.len()))
        .collect()
}

/// Runs fetch (or cache read), categorization, and export.
///
/// # Errors
///
/// Returns [`PipelineError`] from the first stage that fails. Nothing is
/// retried, and a failed export leaves no output file behind.
#[instrument(
    skip(source, options),
    fields(
        source = source.name(),
        username = %options.username,
        cache_mode = %options.cache_mode
    )
)]
pub async fn run_pipeline(
    source: &dyn PostSource,
    options: &PipelineOptions,
) -> Result<PipelineReport, PipelineError> {
    let (posts, origin) = acquire_posts(source, options).await?;
    info!(posts = posts.len(), origin = origin.as_str(), "Posts ready");

    let grouping = group(posts);
    let summary = PdfExporter::new(options.export.clone()).export(&grouping)?;
    Ok(PipelineReport::new(origin, &grouping, summary))
}

/// Fetches posts and writes them to the cache without exporting.
///
/// # Errors
///
/// Returns [`PipelineError`] when fetching or writing the cache fails.
#[instrument(skip(source, cache_path), fields(source = source.name(), cache = %cache_path.display()))]
pub async fn fetch_to_cache(
    source: &dyn PostSource,
    username: &str,
    max_results: u8,
    cache_path: &Path,
) -> Result<Vec<Post>, PipelineError> {
    let posts = source.recent_posts(username, max_results).await?;
    cache::save_posts(cache_path, &posts)?;
    Ok(posts)
}

/// Reads the cache, groups, and exports. Makes no network requests.
///
/// # Errors
///
/// Returns [`PipelineError`] when the cache cannot be read or the export
/// fails.
#[instrument(skip(cache_path, export), fields(cache = %cache_path.display()))]
pub fn export_from_cache(
    cache_path: &Path,
    export: &ExportOptions,
) -> Result<PipelineReport, PipelineError> {
    let posts = cache::load_posts(cache_path)?;
    let grouping = group(posts);
    let summary = PdfExporter::new(export.clone()).export(&grouping)?;
    Ok(PipelineReport::new(PostOrigin::Cache, &grouping, summary))
}

async fn acquire_posts(
    source: &dyn PostSource,
    options: &PipelineOptions,
) -> Result<(Vec<Post>, PostOrigin), PipelineError> {
    if options.cache_mode == CacheMode::Reuse {
        match cache::load_posts(&options.cache_path) {
            Ok(posts) => return Ok((posts, PostOrigin::Cache)),
            Err(error) if error.is_not_found() => {
                debug!("No cache file yet, fetching");
            }
            Err(error) => return Err(error.into()),
        }
    }

    let posts = source
        .recent_posts(&options.username, options.max_results)
        .await?;

    if options.cache_mode.writes_cache() {
        cache::save_posts(&options.cache_path, &posts)?;
    }
    if posts.is_empty() {
        warn!(username = %options.username, "Account returned no posts");
    }
    Ok((posts, PostOrigin::Fetched))
}
