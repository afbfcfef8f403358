//! Error types for the export module.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::CanvasState;

/// Failures of the page canvas itself.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Drawing was attempted before the first page was started.
    #[error("no page has been started")]
    NoPage,

    /// A character of the text is wider than the space between the cursor
    /// and the right margin.
    #[error(
        "not enough horizontal space to render a single character (available {available_mm:.2} mm, need {needed_mm:.2} mm)"
    )]
    NoHorizontalSpace {
        /// Width left for text, in millimetres (may be negative).
        available_mm: f64,
        /// Width of the widest glyph at the current font size, in millimetres.
        needed_mm: f64,
    },

    /// A content stream could not be encoded.
    #[error("failed to encode page content: {0}")]
    Encode(#[from] lopdf::Error),

    /// The finished document could not be serialized.
    #[error("failed to serialize document: {reason}")]
    Write {
        /// Description of the failure.
        reason: String,
    },
}

/// Failures loading a TrueType font for embedding.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font file {path}: {source}")]
    Io {
        /// The font file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The data is not a usable TrueType font.
    #[error("{font} is not a usable TrueType font: {reason}")]
    Parse {
        /// File path or name of the font.
        font: String,
        /// What the parser rejected.
        reason: String,
    },
}

/// What the exporter knew when rendering a post failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDiagnostic {
    /// Which part of the post was being rendered (`timestamp` or `body`).
    pub field: &'static str,
    /// Text as fetched.
    pub raw: String,
    /// Text after normalization.
    pub normalized: String,
    /// Cursor and margins at the time of the failure.
    pub state: CanvasState,
}

impl fmt::Display for RenderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "post {}: raw={:?} normalized={:?} {}",
            self.field, self.raw, self.normalized, self.state
        )
    }
}

/// Errors that can occur while exporting a grouping.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Rendering one post failed; the diagnostic carries the offending text.
    #[error("failed to render {diagnostic}: {source}")]
    Post {
        /// Text and canvas state at the failure.
        diagnostic: Box<RenderDiagnostic>,
        /// The canvas error.
        #[source]
        source: RenderError,
    },

    /// Rendering document furniture (title, headings, dividers) or encoding
    /// the finished document failed.
    #[error("failed to render document: {0}")]
    Render(#[from] RenderError),

    /// File system error writing the output.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// The per-post diagnostic, when the failure happened inside a post.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&RenderDiagnostic> {
        match self {
            Self::Post { diagnostic, .. } => Some(&**diagnostic),
            _ => None,
        }
    }
}
