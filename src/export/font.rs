//! TrueType faces embedded as Unicode PDF fonts.
//!
//! A face is read once with `ttf-parser`: the Unicode character map and the
//! horizontal advances are copied into a lookup table so the canvas can
//! measure text without re-parsing. On output the whole font program is
//! embedded as a `Type0` font over a `CIDFontType2` descendant with
//! `Identity-H` encoding, so text is written as big-endian glyph ids. Only
//! the glyphs that were actually drawn get width entries and `ToUnicode`
//! mappings.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;
use ttf_parser::{Face, GlyphId};

use super::FontError;
use super::canvas::{FontStyle, PT_PER_MM};

/// `ToUnicode` CMaps may hold at most 100 entries per `bfchar` block.
const BFCHAR_BLOCK: usize = 100;
/// Font descriptor flag for a non-symbolic font.
const NONSYMBOLIC: i64 = 32;

/// Glyph id and horizontal advance (in font units) of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub(crate) id: u16,
    pub(crate) advance: u16,
}

/// A parsed TrueType font program ready for embedding.
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    bbox: [i16; 4],
    glyphs: HashMap<char, Glyph>,
    missing_advance: u16,
}

impl fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("glyphs", &self.glyphs.len())
            .finish_non_exhaustive()
    }
}

impl TrueTypeFont {
    /// Reads and parses a `.ttf` file. The PDF font name is derived from the
    /// file stem.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Io`] when the file cannot be read and
    /// [`FontError::Parse`] when it is not a TrueType font with a Unicode
    /// character map.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let data = fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse(&stem, data).map_err(|reason| FontError::Parse {
            font: path.display().to_string(),
            reason,
        })
    }

    /// Parses an in-memory font program.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Parse`] when `data` is not a TrueType font with a
    /// Unicode character map.
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self, FontError> {
        Self::parse(name, data).map_err(|reason| FontError::Parse {
            font: name.to_string(),
            reason,
        })
    }

    fn parse(name: &str, data: Vec<u8>) -> Result<Self, String> {
        let face = Face::parse(&data, 0).map_err(|error| error.to_string())?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    let Some(ch) = char::from_u32(code_point) else {
                        return;
                    };
                    if glyphs.contains_key(&ch) {
                        return;
                    }
                    if let Some(id) = subtable.glyph_index(code_point) {
                        let advance = face.glyph_hor_advance(id).unwrap_or(0);
                        glyphs.insert(ch, Glyph { id: id.0, advance });
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err("no Unicode character map".to_string());
        }

        let units_per_em = face.units_per_em();
        let missing_advance = face
            .glyph_hor_advance(GlyphId(0))
            .unwrap_or(units_per_em / 2);
        let bbox = face.global_bounding_box();
        let (ascent, descent) = (face.ascender(), face.descender());

        Ok(Self {
            name: base_font_name(name),
            units_per_em,
            ascent,
            descent,
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            glyphs,
            missing_advance,
            data,
        })
    }

    /// PostScript-safe name the font is embedded under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of characters the font has glyphs for.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph for `ch`; characters the font lacks map to `.notdef` (id 0).
    /// Tabs are set as spaces.
    pub(crate) fn glyph(&self, ch: char) -> Glyph {
        let ch = if ch == '\t' { ' ' } else { ch };
        self.glyphs.get(&ch).copied().unwrap_or(Glyph {
            id: 0,
            advance: self.missing_advance,
        })
    }

    /// Advance of `ch` at `size_pt`, in millimetres.
    pub(crate) fn advance_mm(&self, ch: char, size_pt: f64) -> f64 {
        f64::from(self.glyph(ch).advance) / f64::from(self.units_per_em) * size_pt / PT_PER_MM
    }

    /// Encodes `text` as `Identity-H` glyph ids and records which glyphs were
    /// drawn. Line breaks are dropped.
    pub(crate) fn encode(&self, text: &str, used: &mut BTreeMap<u16, char>) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars().filter(|ch| *ch != '\r' && *ch != '\n') {
            let glyph = self.glyph(ch);
            if glyph.id != 0 {
                used.entry(glyph.id).or_insert(ch);
            }
            bytes.extend_from_slice(&glyph.id.to_be_bytes());
        }
        bytes
    }

    /// Adds the font program, descriptor, descendant font and `ToUnicode`
    /// map to `doc` and returns the id of the `Type0` font dictionary.
    pub(crate) fn embed(&self, doc: &mut Document, used: &BTreeMap<u16, char>) -> ObjectId {
        let base_font = Object::Name(self.name.as_bytes().to_vec());

        let length = i64::try_from(self.data.len()).unwrap_or(i64::MAX);
        let font_file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => length },
            self.data.clone(),
        ));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font.clone(),
            "Flags" => NONSYMBOLIC,
            "FontBBox" => self.bbox.iter().map(|v| Object::Integer(self.scale(*v))).collect::<Vec<_>>(),
            "ItalicAngle" => 0_i64,
            "Ascent" => self.scale(self.ascent),
            "Descent" => self.scale(self.descent),
            "CapHeight" => self.scale(self.ascent),
            "StemV" => 80_i64,
            "FontFile2" => font_file_id,
        });

        let mut widths = Vec::with_capacity(used.len() * 2);
        for (id, ch) in used {
            widths.push(Object::Integer(i64::from(*id)));
            widths.push(Object::Array(vec![Object::Integer(
                self.scale(self.glyph(*ch).advance),
            )]));
        }
        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0_i64,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => self.scale(self.missing_advance),
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id =
            doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(used).into_bytes()));

        debug!(font = %self.name, glyphs = used.len(), "Embedding font");
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }

    /// Converts font units to the 1000-unit glyph space PDF widths use.
    fn scale(&self, units: impl Into<i32>) -> i64 {
        let scaled = f64::from(units.into()) * 1000.0 / f64::from(self.units_per_em);
        #[allow(clippy::cast_possible_truncation)]
        let rounded = scaled.round() as i64;
        rounded
    }
}

/// Regular and bold faces used in place of the built-in Courier fonts.
#[derive(Debug, Clone)]
pub struct EmbeddedFonts {
    regular: Arc<TrueTypeFont>,
    bold: Arc<TrueTypeFont>,
}

impl EmbeddedFonts {
    /// Loads the regular face and, when given, a separate bold face. Without
    /// a bold face, headings are set in the regular one.
    ///
    /// # Errors
    ///
    /// Returns [`FontError`] when either file cannot be read or parsed.
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self, FontError> {
        let regular = Arc::new(TrueTypeFont::load(regular)?);
        let bold = match bold {
            Some(path) => Arc::new(TrueTypeFont::load(path)?),
            None => Arc::clone(&regular),
        };
        debug!(
            regular = %regular.name(),
            bold = %bold.name(),
            chars = regular.char_count(),
            "Loaded fonts"
        );
        Ok(Self { regular, bold })
    }

    /// Uses one face for both styles.
    #[must_use]
    pub fn single(font: TrueTypeFont) -> Self {
        let regular = Arc::new(font);
        Self {
            bold: Arc::clone(&regular),
            regular,
        }
    }

    pub(crate) fn face(&self, style: FontStyle) -> &TrueTypeFont {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }

    /// Whether both styles are the same font program.
    pub(crate) fn shares_face(&self) -> bool {
        Arc::ptr_eq(&self.regular, &self.bold)
    }
}

/// Builds a `ToUnicode` CMap from glyph ids to the characters they were
/// drawn for.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = used.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (id, ch) in block {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{id:04X}> <{utf16}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

/// Keeps characters that are safe in a PDF name and not PostScript
/// delimiters.
fn base_font_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+' | '.'))
        .collect();
    if name.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        name
    }
}
