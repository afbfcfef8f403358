//! Document assembly: title page, one section per category, one block per post.

use std::fs;
use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::categorize::Grouping;
use crate::normalize::normalize_text;
use crate::post::Post;

use super::canvas::{FontStyle, PageCanvas, PageLayout, Rgb};
use super::font::EmbeddedFonts;
use super::{
    DEFAULT_OUTPUT_PATH, DEFAULT_SUBTITLE, DEFAULT_TITLE, ExportError, RenderDiagnostic,
    RenderError,
};

const HEADING_SIZE: f64 = 18.0;
const HEADING_HEIGHT: f64 = 10.0;
const HEADING_GAP: f64 = 6.0;
const PARAGRAPH_SIZE: f64 = 12.0;
const PARAGRAPH_HEIGHT: f64 = 7.0;
const PARAGRAPH_GAP: f64 = 3.0;
const TIMESTAMP_SIZE: f64 = 10.0;
const TIMESTAMP_HEIGHT: f64 = 6.0;
const BODY_SIZE: f64 = 12.0;
const BODY_HEIGHT: f64 = 7.0;
const POST_GAP: f64 = 6.0;

const TIMESTAMP_COLOR: Rgb = Rgb(120, 120, 120);
const DIVIDER_COLOR: Rgb = Rgb(220, 220, 220);

/// Exporter settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Where the PDF is written.
    pub output_path: PathBuf,
    /// Title page heading and document title metadata.
    pub title: String,
    /// Line under the title page heading.
    pub subtitle: String,
    /// Page geometry.
    pub layout: PageLayout,
    /// Compress content streams.
    pub compress: bool,
    /// TrueType faces for the text. `None` sets everything in Courier, which
    /// can only show Latin-1.
    pub fonts: Option<EmbeddedFonts>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            layout: PageLayout::a4(),
            compress: true,
            fonts: None,
        }
    }
}

/// A rendered document that has not been written anywhere.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Complete PDF file contents.
    pub bytes: Vec<u8>,
    /// Number of pages.
    pub page_count: usize,
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File that was written.
    pub path: PathBuf,
    /// Number of pages, title page included.
    pub page_count: usize,
    /// Number of category sections.
    pub categories: usize,
    /// Number of posts rendered.
    pub posts: usize,
    /// Size of the file in bytes.
    pub bytes: usize,
}

/// Renders a [`Grouping`] into a PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    options: ExportOptions,
}

impl PdfExporter {
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Renders the grouping to PDF bytes without touching the file system.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Post`] when a post cannot be rendered (after
    /// logging its raw text, normalized text and canvas state), or
    /// [`ExportError::Render`] when the rest of the document cannot be.
    #[instrument(skip(self, grouping), fields(posts = grouping.post_count()))]
    pub fn render(&self, grouping: &Grouping) -> Result<RenderedDocument, ExportError> {
        let mut canvas = PageCanvas::with_fonts(self.options.layout, self.options.fonts.clone());

        canvas.add_page();
        heading(&mut canvas, &self.options.title)?;
        paragraph(&mut canvas, &self.options.subtitle)?;

        for (label, posts) in grouping.iter() {
            canvas.add_page();
            heading(&mut canvas, label.as_str())?;
            for post in posts {
                render_post(&mut canvas, post)?;
            }
        }

        let page_count = canvas.page_count();
        let bytes = canvas.finish(&self.options.title, self.options.compress)?;
        Ok(RenderedDocument { bytes, page_count })
    }

    /// Renders the grouping and writes it to the configured output path,
    /// creating the containing directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when rendering fails or the file cannot be
    /// written. Nothing is written when rendering fails.
    #[instrument(skip(self, grouping), fields(path = %self.options.output_path.display()))]
    pub fn export(&self, grouping: &Grouping) -> Result<ExportSummary, ExportError> {
        let document = self.render(grouping)?;
        let path = &self.options.output_path;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, &document.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        let summary = ExportSummary {
            path: path.clone(),
            page_count: document.page_count,
            categories: grouping.category_count(),
            posts: grouping.post_count(),
            bytes: document.bytes.len(),
        };
        info!(
            pages = summary.page_count,
            categories = summary.categories,
            posts = summary.posts,
            bytes = summary.bytes,
            "Saved PDF"
        );
        Ok(summary)
    }
}

fn heading(canvas: &mut PageCanvas, text: &str) -> Result<(), RenderError> {
    canvas.set_font(FontStyle::Bold, HEADING_SIZE);
    canvas.set_text_color(Rgb::BLACK);
    canvas.cell(HEADING_HEIGHT, &normalize_text(text))?;
    canvas.ln(HEADING_GAP);
    Ok(())
}

fn paragraph(canvas: &mut PageCanvas, text: &str) -> Result<(), RenderError> {
    canvas.set_font(FontStyle::Regular, PARAGRAPH_SIZE);
    canvas.cell(PARAGRAPH_HEIGHT, &normalize_text(text))?;
    canvas.ln(PARAGRAPH_GAP);
    Ok(())
}

fn render_post(canvas: &mut PageCanvas, post: &Post) -> Result<(), ExportError> {
    let left = canvas.layout().left_margin;
    let created = normalize_text(&post.timestamp);
    let text = normalize_text(&post.body);

    canvas.set_font(FontStyle::Regular, TIMESTAMP_SIZE);
    canvas.set_text_color(TIMESTAMP_COLOR);
    canvas.set_x(left);
    canvas
        .multi_cell(0.0, TIMESTAMP_HEIGHT, &created)
        .map_err(|source| post_failure(canvas, "timestamp", &post.timestamp, &created, source))?;

    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Regular, BODY_SIZE);
    canvas.set_x(left);
    canvas
        .multi_cell(0.0, BODY_HEIGHT, &text)
        .map_err(|source| post_failure(canvas, "body", &post.body, &text, source))?;

    let layout = canvas.layout();
    let y = canvas.y();
    canvas.set_draw_color(DIVIDER_COLOR);
    canvas.line(left, y, layout.width - layout.right_margin, y)?;

    canvas.ln(POST_GAP);
    Ok(())
}

fn post_failure(
    canvas: &PageCanvas,
    field: &'static str,
    raw: &str,
    normalized: &str,
    source: RenderError,
) -> ExportError {
    let state = canvas.state();
    error!(
        field,
        raw = ?raw,
        normalized = ?normalized,
        x = state.x,
        y = state.y,
        left_margin = state.left_margin,
        right_margin = state.right_margin,
        page_width = state.page_width,
        error = %source,
        "Failed to render post text"
    );
    ExportError::Post {
        diagnostic: Box::new(RenderDiagnostic {
            field,
            raw: raw.to_string(),
            normalized: normalized.to_string(),
            state,
        }),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::categorize::group;
    use lopdf::Document;
    use tempfile::TempDir;

    fn uncompressed() -> PdfExporter {
        PdfExporter::new(ExportOptions {
            compress: false,
            ..ExportOptions::default()
        })
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_empty_grouping_renders_title_page_only() {
        let document = uncompressed().render(&Grouping::new()).unwrap();
        assert_eq!(document.page_count, 1);
        assert_eq!(page_count(&document.bytes), 1);
        let raw = String::from_utf8_lossy(&document.bytes);
        assert!(raw.contains("(X2PDF)"));
        assert!(raw.contains("(Your tweets, grouped into categories.)"));
    }

    #[test]
    fn test_one_page_per_category_in_alphabetical_order() {
        let grouping = group(vec![
            Post::new("2024-01-01T00:00:00.000Z", "python tips"),
            Post::new("2024-01-02T00:00:00.000Z", "bitcoin rally"),
            Post::new("2024-01-03T00:00:00.000Z", "morning routine"),
        ]);
        let document = uncompressed().render(&grouping).unwrap();
        assert_eq!(document.page_count, 4);

        let raw = String::from_utf8_lossy(&document.bytes);
        let finance = raw.find("(Finance)").unwrap();
        let productivity = raw.find("(Productivity)").unwrap();
        let software = raw.find("(Software Development)").unwrap();
        assert!(finance < productivity && productivity < software);
    }

    #[test]
    fn test_post_text_is_normalized_before_rendering() {
        let grouping = group(vec![Post::new("t", "stock\u{2014}market")]);
        let document = uncompressed().render(&grouping).unwrap();
        let raw = String::from_utf8_lossy(&document.bytes);
        assert!(raw.contains("(stock- market)"), "normalized body missing");
    }

    #[test]
    fn test_embedded_font_keeps_non_latin_text() {
        use crate::export::font::fixture;
        use lopdf::Object;
        use lopdf::content::Content;

        let exporter = PdfExporter::new(ExportOptions {
            compress: false,
            fonts: Some(EmbeddedFonts::single(fixture::font())),
            ..ExportOptions::default()
        });
        let body = "Привет мир ΑΒΓ ł ő 🚀 code";
        let grouping = group(vec![Post::new("2024-03-01", body)]);
        let document = exporter.render(&grouping).unwrap();

        let doc = Document::load_mem(&document.bytes).unwrap();
        let pages = doc.get_pages();
        let section = *pages.get(&2).unwrap();
        let content = Content::decode(&doc.get_page_content(section).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();

        let expected_body: Vec<u8> = normalize_text(body)
            .chars()
            .flat_map(|ch| fixture::glyph_id(ch).to_be_bytes())
            .collect();
        assert!(shown.contains(&expected_body), "body not drawn as glyph ids");
        let cyrillic = fixture::glyph_id('П').to_be_bytes();
        assert!(expected_body.windows(2).any(|pair| pair == cyrillic));

        let raw = String::from_utf8_lossy(&document.bytes);
        assert!(!raw.contains("??????"), "Cyrillic replaced by question marks");
        assert!(raw.contains("/ToUnicode"));
    }

    #[test]
    fn test_long_bucket_spills_onto_more_pages() {
        let posts: Vec<Post> = (0..60)
            .map(|i| Post::new(format!("2024-01-{:02}", i % 28 + 1), "bitcoin ".repeat(30)))
            .collect();
        let document = uncompressed().render(&group(posts)).unwrap();
        assert!(document.page_count > 2, "pages: {}", document.page_count);
        assert_eq!(page_count(&document.bytes), document.page_count);
    }

    #[test]
    fn test_render_failure_reports_raw_and_normalized_text() {
        let layout = PageLayout {
            left_margin: 105.0,
            right_margin: 105.0,
            ..PageLayout::a4()
        };
        let exporter = PdfExporter::new(ExportOptions {
            layout,
            ..ExportOptions::default()
        });
        let grouping = group(vec![Post::new("2024\u{2013}01", "java\u{2014}rocks")]);

        let err = exporter.render(&grouping).unwrap_err();
        let diagnostic = err.diagnostic().unwrap();
        assert_eq!(diagnostic.field, "timestamp");
        assert_eq!(diagnostic.raw, "2024\u{2013}01");
        assert_eq!(diagnostic.normalized, "2024- 01");
        assert!((diagnostic.state.left_margin - 105.0).abs() < 1e-9);
        assert_eq!(diagnostic.state.page, 2);
        assert!(matches!(
            err,
            ExportError::Post {
                source: RenderError::NoHorizontalSpace { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_export_creates_directory_and_writes_file() {
        let dir = TempDir::new().unwrap();
        let output_path = dir.path().join("exports").join("X2PDF.pdf");
        let exporter = PdfExporter::new(ExportOptions {
            output_path: output_path.clone(),
            ..ExportOptions::default()
        });
        let grouping = group(vec![Post::new("t", "llm benchmarks")]);

        let summary = exporter.export(&grouping).unwrap();
        assert_eq!(summary.path, output_path);
        assert_eq!(summary.page_count, 2);
        assert_eq!(summary.categories, 1);
        assert_eq!(summary.posts, 1);

        let bytes = fs::read(&output_path).unwrap();
        assert_eq!(bytes.len(), summary.bytes);
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn test_export_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output_path = dir.path().join("out").join("X2PDF.pdf");
        let exporter = PdfExporter::new(ExportOptions {
            output_path: output_path.clone(),
            layout: PageLayout {
                left_margin: 200.0,
                ..PageLayout::a4()
            },
            ..ExportOptions::default()
        });
        let grouping = group(vec![Post::new("t", "x")]);

        assert!(exporter.export(&grouping).is_err());
        assert!(!output_path.exists());
    }
}
