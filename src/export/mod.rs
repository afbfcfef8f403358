//! PDF export of grouped posts.
//!
//! - [`PageCanvas`] - Stateful page canvas (cursor, fonts, colors, wrapping)
//! - [`EmbeddedFonts`] - TrueType faces embedded for text outside Latin-1
//! - [`PdfExporter`] - Lays out a [`Grouping`](crate::Grouping) as a title page
//!   followed by one section per category
//! - [`ExportError`] - Failures, including per-post render diagnostics

mod canvas;
mod error;
mod exporter;
mod font;

pub use canvas::{CanvasState, FontStyle, PageCanvas, PageLayout, Rgb};
pub use error::{ExportError, FontError, RenderDiagnostic, RenderError};
pub use exporter::{ExportOptions, ExportSummary, PdfExporter, RenderedDocument};
pub use font::{EmbeddedFonts, TrueTypeFont};

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "exports/X2PDF.pdf";

/// Default document title, shown as the title page heading.
pub const DEFAULT_TITLE: &str = "X2PDF";

/// Default line under the title page heading.
pub const DEFAULT_SUBTITLE: &str = "Your tweets, grouped into categories.";
