//! Text normalization for the PDF renderer.
//!
//! Post text is full of characters a fixed-width page renderer handles badly:
//! invisible spaces, typographic punctuation, and very long unbroken tokens
//! (URLs, handles, `snake_case` identifiers). [`normalize_text`] turns any input
//! into text the exporter can always wrap.

use tracing::instrument;

/// Longest run of non-space characters the renderer is handed.
pub const WRAP_CHUNK: usize = 18;

/// Normalizes raw post text for rendering.
///
/// Steps, in order:
/// 1. Non-breaking spaces become spaces; zero-width spaces and BOMs are removed
/// 2. Curly quotes and en/em dashes become their ASCII equivalents
/// 3. A space is inserted after every `/`, `-` and `_` to create wrap points
/// 4. Control characters other than newline, carriage return and tab are removed
/// 5. Tokens longer than [`WRAP_CHUNK`] are split with [`force_wrap_long_tokens`]
///
/// Never fails; empty input yields an empty string.
#[must_use]
#[instrument(level = "trace", skip(raw), fields(len = raw.len()))]
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for ch in raw.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{200B}' | '\u{FEFF}' => {}
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push_str("- "),
            '/' | '-' | '_' => {
                out.push(ch);
                out.push(' ');
            }
            c if is_stripped_control(c) => {}
            c => out.push(c),
        }
    }

    force_wrap_long_tokens(&out, WRAP_CHUNK)
}

/// Ensures no space-delimited token is longer than `chunk` characters.
///
/// The text is split on single spaces, long tokens are re-emitted as
/// `chunk`-sized pieces joined by spaces, and the tokens are joined back with
/// single spaces. Other whitespace (newlines, tabs) is not a token boundary.
/// A `chunk` of zero returns the input unchanged.
#[must_use]
pub fn force_wrap_long_tokens(text: &str, chunk: usize) -> String {
    if chunk == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / chunk);
    for (index, token) in text.split(' ').enumerate() {
        if index > 0 {
            out.push(' ');
        }
        if token.chars().count() <= chunk {
            out.push_str(token);
            continue;
        }
        for (count, ch) in token.chars().enumerate() {
            if count > 0 && count % chunk == 0 {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}

fn is_stripped_control(ch: char) -> bool {
    matches!(ch, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}
