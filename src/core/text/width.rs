//! Grapheme width and visible width helpers.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::extract_ansi_code;

/// Display width of a single grapheme cluster in terminal columns.
///
/// RGI emoji (including presentation sequences such as `❤️`) occupy two columns even when
/// their base code point is narrow. Control characters have no width.
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// `ch` when it occupies exactly one column, a space otherwise.
pub fn single_cell(ch: char) -> char {
    if grapheme_width(ch.encode_utf8(&mut [0; 4])) == 1 {
        ch
    } else {
        ' '
    }
}

/// Width of plain text (no escape sequences) in terminal columns.
pub fn plain_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Width of `input` in terminal columns, ignoring ANSI control sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }

    let mut width = 0;
    let mut idx = 0;
    while idx < input.len() {
        if let Some(ansi) = extract_ansi_code(input, idx) {
            idx += ansi.length;
            continue;
        }

        let end = next_escape_or_end(input, idx);
        width += plain_width(&input[idx..end]);
        idx = end;
    }
    width
}

pub(crate) fn next_escape_or_end(input: &str, from: usize) -> usize {
    // A bare ESC that does not start a recognised sequence is treated as text so the scan
    // always makes progress.
    let search_from = if input.as_bytes().get(from) == Some(&0x1b) {
        from + 1
    } else {
        from
    };
    input[search_from..]
        .find('\x1b')
        .map(|offset| search_from + offset)
        .unwrap_or(input.len())
}
