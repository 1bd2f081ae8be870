//! Truncation and padding helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::extract_ansi_code;
use super::width::{grapheme_width, next_escape_or_end, plain_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

/// Truncate plain text (no escape sequences) to at most `max_width` columns.
///
/// A wide grapheme that would straddle the limit is dropped rather than split.
pub fn truncate_plain(text: &str, max_width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme_width(grapheme);
        if width + w > max_width {
            break;
        }
        out.push_str(grapheme);
        width += w;
    }
    out
}

/// Truncate or right-pad plain text to exactly `width` columns using `fill`.
pub fn fit_plain(text: &str, width: usize, fill: char) -> String {
    let mut fitted = truncate_plain(text, width);
    let used = plain_width(&fitted);
    for _ in used..width {
        fitted.push(fill);
    }
    fitted
}

/// ANSI-aware truncation to `max_width` visible columns.
///
/// Escape sequences are preserved; when anything was cut from styled text, a reset is
/// appended so an open color run never leaks past the truncated line.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let mut truncated = String::with_capacity(text.len());
    let mut copied_escape = false;
    let mut current = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(ansi) = extract_ansi_code(text, idx) {
            truncated.push_str(&ansi.code);
            copied_escape = true;
            idx += ansi.length;
            continue;
        }

        let end = next_escape_or_end(text, idx);
        for grapheme in text[idx..end].graphemes(true) {
            let w = grapheme_width(grapheme);
            if current + w > max_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current += w;
        }
        idx = end;
    }

    if copied_escape {
        truncated.push_str(ANSI_RESET);
    }
    truncated
}
