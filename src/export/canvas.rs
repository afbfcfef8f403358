//! Single-pass page canvas over the `lopdf` object model.
//!
//! Coordinates are millimetres from the top-left corner of the page. Text is
//! set in the built-in Courier faces (WinAnsi only, every glyph the same
//! width) unless [`EmbeddedFonts`] are supplied, in which case lines are
//! measured with the embedded face's real advances.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use super::RenderError;
use super::font::EmbeddedFonts;

/// PDF points per millimetre.
pub(crate) const PT_PER_MM: f64 = 72.0 / 25.4;
/// Courier advance width as a fraction of the font size.
const GLYPH_ADVANCE_EM: f64 = 0.6;
/// Horizontal padding inside a cell, in millimetres.
const CELL_PADDING_MM: f64 = 1.0;
/// Stroke width of divider lines, in millimetres.
const LINE_WIDTH_MM: f64 = 0.2;
/// Slack for floating-point width comparisons.
const WIDTH_EPSILON: f64 = 1e-6;

/// Page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Left margin.
    pub left_margin: f64,
    /// Right margin.
    pub right_margin: f64,
    /// Top margin; the cursor starts here on every new page.
    pub top_margin: f64,
    /// Distance from the bottom edge at which content breaks to a new page.
    pub break_margin: f64,
}

impl PageLayout {
    /// A4 portrait with 10 mm side/top margins and a 15 mm page-break margin.
    #[must_use]
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            left_margin: 10.0,
            right_margin: 10.0,
            top_margin: 10.0,
            break_margin: 15.0,
        }
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// Font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Regular => 0,
            Self::Bold => 1,
        }
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    fn operands(self) -> Vec<Object> {
        [self.0, self.1, self.2]
            .into_iter()
            .map(|component| real(f64::from(component) / 255.0))
            .collect()
    }
}

/// Snapshot of the cursor and margins, used in failure reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasState {
    /// Cursor x position.
    pub x: f64,
    /// Cursor y position.
    pub y: f64,
    /// Left margin.
    pub left_margin: f64,
    /// Right margin.
    pub right_margin: f64,
    /// Page width.
    pub page_width: f64,
    /// One-based number of the current page (0 before the first page).
    pub page: usize,
}

impl std::fmt::Display for CanvasState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page={} x={:.2} y={:.2} lm={:.2} rm={:.2} w={:.2}",
            self.page, self.x, self.y, self.left_margin, self.right_margin, self.page_width
        )
    }
}

/// Stateful page canvas: a cursor, current font and colors, and the content
/// operations of every page emitted so far.
#[derive(Debug)]
pub struct PageCanvas {
    layout: PageLayout,
    x: f64,
    y: f64,
    font: FontStyle,
    font_size: f64,
    text_color: Rgb,
    draw_color: Rgb,
    pages: Vec<Vec<Operation>>,
    fonts: Option<EmbeddedFonts>,
    /// Glyphs drawn so far per style, keyed by glyph id.
    used_glyphs: [BTreeMap<u16, char>; 2],
}

impl PageCanvas {
    /// Creates an empty Courier canvas; call [`PageCanvas::add_page`] before
    /// drawing.
    #[must_use]
    pub fn new(layout: PageLayout) -> Self {
        Self::with_fonts(layout, None)
    }

    /// Creates an empty canvas that sets text in `fonts`, or in Courier when
    /// `None`.
    #[must_use]
    pub fn with_fonts(layout: PageLayout, fonts: Option<EmbeddedFonts>) -> Self {
        Self {
            x: layout.left_margin,
            y: layout.top_margin,
            layout,
            font: FontStyle::Regular,
            font_size: 12.0,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            pages: Vec::new(),
            fonts,
            used_glyphs: [BTreeMap::new(), BTreeMap::new()],
        }
    }

    /// Starts a new page and moves the cursor to its top-left margin corner.
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.x = self.layout.left_margin;
        self.y = self.layout.top_margin;
    }

    /// Number of pages started so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Selects the font face and size (in points) for subsequent text.
    pub fn set_font(&mut self, style: FontStyle, size_pt: f64) {
        self.font = style;
        self.font_size = size_pt;
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    pub fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    /// Current cursor x.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Current cursor y.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    #[must_use]
    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    /// Snapshot of cursor and margins.
    #[must_use]
    pub fn state(&self) -> CanvasState {
        CanvasState {
            x: self.x,
            y: self.y,
            left_margin: self.layout.left_margin,
            right_margin: self.layout.right_margin,
            page_width: self.layout.width,
            page: self.pages.len(),
        }
    }

    /// Moves to the left margin and down by `h`.
    pub fn ln(&mut self, h: f64) {
        self.x = self.layout.left_margin;
        self.y += h;
    }

    /// Writes one unwrapped line of height `h`, then moves to the next line.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoPage`] when no page has been started.
    pub fn cell(&mut self, h: f64, text: &str) -> Result<(), RenderError> {
        self.ensure_page()?;
        self.break_page_if_needed(h);
        let line = text.replace(['\n', '\r'], " ");
        self.emit_text(self.x + CELL_PADDING_MM, h, &line)?;
        self.ln(h);
        Ok(())
    }

    /// Writes `text` as a wrapped block of lines of height `h`.
    ///
    /// A `w` of zero extends the block to the right margin. Lines break at
    /// spaces; words longer than a line are split. Pages break automatically.
    /// The cursor ends at the left margin below the block.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoPage`] when no page has been started, or
    /// [`RenderError::NoHorizontalSpace`] when some character of `text` is
    /// wider than the block.
    pub fn multi_cell(&mut self, w: f64, h: f64, text: &str) -> Result<(), RenderError> {
        self.ensure_page()?;

        let width = if w <= 0.0 {
            self.layout.width - self.layout.right_margin - self.x
        } else {
            w
        };
        let usable = width - 2.0 * CELL_PADDING_MM;
        let needed = text
            .chars()
            .filter(|ch| *ch != '\n' && *ch != '\r')
            .map(|ch| self.advance(ch))
            .fold(self.advance(' '), f64::max);
        if usable <= 0.0 || usable + WIDTH_EPSILON < needed {
            return Err(RenderError::NoHorizontalSpace {
                available_mm: usable,
                needed_mm: needed,
            });
        }

        let lines = wrap_lines(text, usable, |ch| self.advance(ch));
        let left = self.x;
        for line in lines {
            if self.break_page_if_needed(h) {
                self.x = left;
            }
            self.emit_text(left + CELL_PADDING_MM, h, &line)?;
            self.y += h;
        }
        self.x = self.layout.left_margin;
        Ok(())
    }

    /// Strokes a straight line in the current draw color.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoPage`] when no page has been started.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), RenderError> {
        let (height, color) = (self.layout.height, self.draw_color);
        let ops = self.current_page_mut()?;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![real(LINE_WIDTH_MM * PT_PER_MM)]));
        ops.push(Operation::new("RG", color.operands()));
        ops.push(Operation::new(
            "m",
            vec![real(x1 * PT_PER_MM), real((height - y1) * PT_PER_MM)],
        ));
        ops.push(Operation::new(
            "l",
            vec![real(x2 * PT_PER_MM), real((height - y2) * PT_PER_MM)],
        ));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    /// Encodes every page into a complete PDF file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when no page exists or encoding fails.
    pub fn finish(self, title: &str, compress: bool) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            return Err(RenderError::NoPage);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let (regular_id, bold_id) = match &self.fonts {
            None => (
                doc.add_object(courier("Courier")),
                doc.add_object(courier("Courier-Bold")),
            ),
            Some(fonts) if fonts.shares_face() => {
                let [regular, bold] = &self.used_glyphs;
                let mut used = regular.clone();
                used.extend(bold.iter().map(|(id, ch)| (*id, *ch)));
                let id = fonts.face(FontStyle::Regular).embed(&mut doc, &used);
                (id, id)
            }
            Some(fonts) => (
                fonts
                    .face(FontStyle::Regular)
                    .embed(&mut doc, &self.used_glyphs[FontStyle::Regular.index()]),
                fonts
                    .face(FontStyle::Bold)
                    .embed(&mut doc, &self.used_glyphs[FontStyle::Bold.index()]),
            ),
        };
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FontStyle::Regular.resource_name() => regular_id,
                FontStyle::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    real(self.layout.width * PT_PER_MM),
                    real(self.layout.height * PT_PER_MM),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(title),
            "Producer" => Object::string_literal("x2pdf"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        if compress {
            doc.compress();
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|error| RenderError::Write {
            reason: error.to_string(),
        })?;
        Ok(bytes)
    }

    /// Advance of `ch` in the current font, in millimetres.
    fn advance(&self, ch: char) -> f64 {
        match &self.fonts {
            Some(fonts) => fonts.face(self.font).advance_mm(ch, self.font_size),
            None => self.font_size * GLYPH_ADVANCE_EM / PT_PER_MM,
        }
    }

    fn encode_text(&mut self, text: &str) -> Object {
        match &self.fonts {
            Some(fonts) => {
                let used = &mut self.used_glyphs[self.font.index()];
                Object::String(
                    fonts.face(self.font).encode(text, used),
                    StringFormat::Hexadecimal,
                )
            }
            None => Object::string_literal(encode_win_ansi(text)),
        }
    }

    fn ensure_page(&self) -> Result<(), RenderError> {
        if self.pages.is_empty() {
            Err(RenderError::NoPage)
        } else {
            Ok(())
        }
    }

    fn current_page_mut(&mut self) -> Result<&mut Vec<Operation>, RenderError> {
        self.pages.last_mut().ok_or(RenderError::NoPage)
    }

    /// Starts a new page when a line of height `h` would cross the break
    /// margin. Returns `true` if a page was added.
    fn break_page_if_needed(&mut self, h: f64) -> bool {
        let limit = self.layout.height - self.layout.break_margin;
        let at_top = (self.y - self.layout.top_margin).abs() < WIDTH_EPSILON;
        if self.y + h > limit + WIDTH_EPSILON && !at_top {
            self.add_page();
            return true;
        }
        false
    }

    fn emit_text(&mut self, x: f64, h: f64, text: &str) -> Result<(), RenderError> {
        let font_size_mm = self.font_size / PT_PER_MM;
        let baseline = self.y + 0.5 * h + 0.3 * font_size_mm;
        let (page_height, font, size, color) =
            (self.layout.height, self.font, self.font_size, self.text_color);
        self.ensure_page()?;
        let encoded = self.encode_text(text);

        let ops = self.current_page_mut()?;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), real(size)],
        ));
        ops.push(Operation::new("rg", color.operands()));
        ops.push(Operation::new(
            "Td",
            vec![real(x * PT_PER_MM), real((page_height - baseline) * PT_PER_MM)],
        ));
        ops.push(Operation::new("Tj", vec![encoded]));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn courier(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Document metadata string: literal for ASCII, UTF-16BE with a byte-order
/// mark otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Literal)
}

/// Splits text into lines no wider than `max_width`, measuring each
/// character with `advance`.
///
/// Embedded newlines always break; a trailing `\r` before a newline is
/// dropped. Within a paragraph, lines break at the last space that fits (the
/// space itself is dropped) and words wider than a line are split. Other
/// spaces, leading ones included, are kept. An empty paragraph yields one
/// empty line; a paragraph that ends exactly at a break yields no trailing
/// empty line. Every line holds at least one character, so a character wider
/// than `max_width` gets a line of its own.
pub(crate) fn wrap_lines(
    text: &str,
    max_width: f64,
    advance: impl Fn(char) -> f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let chars: Vec<char> = paragraph.chars().collect();
        let first_line = lines.len();

        let mut start = 0;
        let mut index = 0;
        let mut width = 0.0;
        let mut last_space = None;
        while index < chars.len() {
            let ch = chars[index];
            if ch == ' ' {
                last_space = Some(index);
            }
            let ch_width = advance(ch);
            if width + ch_width <= max_width + WIDTH_EPSILON {
                width += ch_width;
                index += 1;
                continue;
            }

            match last_space {
                Some(space) if space > start => {
                    lines.push(chars[start..space].iter().collect());
                    start = space + 1;
                }
                _ => {
                    let end = index.max(start + 1);
                    lines.push(chars[start..end].iter().collect());
                    start = end;
                }
            }
            index = start;
            width = 0.0;
            last_space = None;
        }

        if start < chars.len() || lines.len() == first_line {
            lines.push(chars[start..].iter().collect());
        }
    }

    lines
}

/// Encodes text for the standard fonts' `WinAnsiEncoding`.
///
/// Latin-1 characters map to themselves, a handful of typographic characters
/// map to their WinAnsi slots, tabs become spaces, and everything else becomes
/// `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|ch| *ch != '\r' && *ch != '\n')
        .map(|ch| match ch {
            '\t' => b' ',
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            c => match u8::try_from(u32::from(c)) {
                Ok(byte) if (0x20..0x7F).contains(&byte) || byte >= 0xA0 => byte,
                _ => b'?',
            },
        })
        .collect()
}
