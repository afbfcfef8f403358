//! JSON post cache shared between fetch and export runs.
//!
//! The cache is a pretty-printed JSON array of `{ "created_at", "text" }`
//! objects. Non-ASCII text is written as-is (UTF-8), not escaped.

mod error;

pub use error::CacheError;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, instrument};

use crate::post::Post;

/// Default cache file, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "tweets.json";

/// How a run uses the post cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Always fetch, then overwrite the cache.
    #[default]
    Refresh,
    /// Read the cache when it exists; otherwise fetch and write it.
    Reuse,
    /// Always fetch and never touch the cache.
    Off,
}

impl CacheMode {
    /// Stable string label, as accepted by [`CacheMode::from_str`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Reuse => "reuse",
            Self::Off => "off",
        }
    }

    /// Whether fetched posts should be written back to the cache.
    #[must_use]
    pub fn writes_cache(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMode {
    type Err = CacheError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "refresh" => Ok(Self::Refresh),
            "reuse" => Ok(Self::Reuse),
            "off" => Ok(Self::Off),
            other => Err(CacheError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Reads cached posts.
///
/// # Errors
///
/// Returns [`CacheError`] when the file cannot be read or is not a JSON array
/// of posts.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_posts(path: &Path) -> Result<Vec<Post>, CacheError> {
    let raw = fs::read_to_string(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let posts: Vec<Post> = serde_json::from_str(&raw).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(posts = posts.len(), "Loaded cached posts");
    Ok(posts)
}

/// Writes posts to the cache, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`CacheError`] when the directory or file cannot be written.
#[instrument(skip(path, posts), fields(path = %path.display(), posts = posts.len()))]
pub fn save_posts(path: &Path, posts: &[Post]) -> Result<(), CacheError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| CacheError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut json = serde_json::to_string_pretty(posts).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    fs::write(path, json).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved posts to cache");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_preserves_order_and_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tweets.json");
        let posts = vec![
            Post::new("2024-05-01T10:00:00.000Z", "first — with an em dash"),
            Post::new("2024-05-02T10:00:00.000Z", "second 🚀"),
        ];

        save_posts(&path, &posts).unwrap();
        let loaded = load_posts(&path).unwrap();
        assert_eq!(loaded, posts);
    }

    #[test]
    fn test_save_writes_utf8_unescaped_with_wire_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tweets.json");
        save_posts(&path, &[Post::new("t", "café")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("café"), "non-ASCII must not be escaped: {raw}");
        assert!(raw.contains("\"created_at\""));
        assert!(raw.contains("\"text\""));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache").join("posts.json");
        save_posts(&path, &[]).unwrap();
        assert!(path.exists());
        assert!(load_posts(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_posts(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"created_at": "t"}]"#).unwrap();
        let err = load_posts(&path).unwrap_err();
        assert!(matches!(err, CacheError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_cache_mode_parse_and_display() {
        for mode in [CacheMode::Refresh, CacheMode::Reuse, CacheMode::Off] {
            assert_eq!(mode.as_str().parse::<CacheMode>().unwrap(), mode);
        }
        assert!("sometimes".parse::<CacheMode>().is_err());
        assert_eq!(CacheMode::default(), CacheMode::Refresh);
        assert!(!CacheMode::Off.writes_cache());
        assert!(CacheMode::Reuse.writes_cache());
    }
}
