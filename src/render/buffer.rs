//! Plain-text render buffers with positional color spans.
//!
//! Color is metadata until the very end: layout splices plain text and translates spans,
//! and only [`RenderBuffer::to_lines`] turns spans into SGR sequences.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::style::{Color, Position, Size, SGR_RESET};
use crate::core::text::utils::{fit_plain, truncate_plain};
use crate::core::text::width::{grapheme_width, plain_width, single_cell};

/// Half-open column range `[start, end)` drawn in `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpan {
    pub start: usize,
    pub end: usize,
    pub color: Color,
}

impl ColorSpan {
    pub fn contains(&self, column: usize) -> bool {
        self.start <= column && column < self.end
    }
}

/// A `width` x `height` grid of plain text lines, each exactly `width` columns wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBuffer {
    width: usize,
    lines: Vec<String>,
    spans: Vec<Vec<ColorSpan>>,
}

impl RenderBuffer {
    /// A buffer filled with `fill`.
    pub fn new(size: Size, fill: char) -> Self {
        let fill = single_cell(fill);
        let line: String = std::iter::repeat(fill).take(size.width).collect();
        Self {
            width: size.width,
            lines: vec![line; size.height],
            spans: vec![Vec::new(); size.height],
        }
    }

    pub fn blank(size: Size) -> Self {
        Self::new(size, ' ')
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height())
    }

    /// Plain text of every line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, y: usize) -> Option<&str> {
        self.lines.get(y).map(String::as_str)
    }

    pub fn spans(&self, y: usize) -> &[ColorSpan] {
        self.spans.get(y).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace a whole line, truncating or padding it to the buffer width.
    pub fn set_line(&mut self, y: usize, content: &str) {
        if let Some(line) = self.lines.get_mut(y) {
            *line = fit_plain(content, self.width, ' ');
        }
    }

    /// Overwrite text starting at column `x`, clipped to the buffer width.
    ///
    /// Returns the number of columns written.
    pub fn write_at(&mut self, y: usize, x: usize, text: &str) -> usize {
        let width = self.width;
        let Some(line) = self.lines.get_mut(y) else {
            return 0;
        };
        let (spliced, written) = splice_line(line, width, x, text);
        *line = spliced;
        written
    }

    /// Color `[start, end)` on line `y`. The span is clamped to the line; empty spans are dropped.
    pub fn add_color(&mut self, y: usize, start: usize, end: usize, color: Color) {
        let end = end.min(self.width);
        if start >= end {
            return;
        }
        if let Some(spans) = self.spans.get_mut(y) {
            spans.push(ColorSpan { start, end, color });
        }
    }

    /// Copy `child` into this buffer with its top-left corner at `at`.
    ///
    /// Text is spliced by visual column; the parent's spans over the covered range are cut
    /// away and the child's spans are translated by `at.x` and clipped to this buffer.
    pub fn splice(&mut self, child: &RenderBuffer, at: Position) {
        for (row, child_line) in child.lines.iter().enumerate() {
            let y = at.y + row;
            if y >= self.lines.len() {
                break;
            }
            let written = self.write_at(y, at.x, child_line);
            if written == 0 {
                continue;
            }
            let covered_end = at.x + written;
            cut_spans(&mut self.spans[y], at.x, covered_end);
            for span in child.spans(row) {
                self.add_color(y, at.x + span.start, (at.x + span.end).min(covered_end), span.color);
            }
        }
    }

    /// Top-left `size` portion of this buffer. Wide glyphs cut by the right edge become spaces.
    pub fn crop(&self, size: Size) -> RenderBuffer {
        let width = size.width.min(self.width);
        let height = size.height.min(self.height());
        let lines = self.lines[..height]
            .iter()
            .map(|line| fit_plain(line, width, ' '))
            .collect();
        let spans = self.spans[..height]
            .iter()
            .map(|spans| {
                spans
                    .iter()
                    .filter(|span| span.start < width)
                    .map(|span| ColorSpan {
                        end: span.end.min(width),
                        ..*span
                    })
                    .collect()
            })
            .collect();
        RenderBuffer {
            width,
            lines,
            spans,
        }
    }

    /// Produce final colored strings: SGR opened at span boundaries, reset after every run.
    pub fn to_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .zip(&self.spans)
            .map(|(line, spans)| apply_colors(line, spans))
            .collect()
    }

    pub fn into_plain_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Color in effect at `column`: the last span that covers it.
fn color_at(spans: &[ColorSpan], column: usize) -> Option<Color> {
    spans
        .iter()
        .rev()
        .find(|span| span.contains(column))
        .map(|span| span.color)
}

fn apply_colors(line: &str, spans: &[ColorSpan]) -> String {
    if spans.is_empty() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + spans.len() * 10);
    let mut current: Option<Color> = None;
    let mut column = 0;
    for grapheme in line.graphemes(true) {
        let color = color_at(spans, column);
        if color != current {
            if current.is_some() {
                out.push_str(SGR_RESET);
            }
            if let Some(color) = color {
                out.push_str(&color.sgr());
            }
            current = color;
        }
        out.push_str(grapheme);
        column += grapheme_width(grapheme);
    }
    if current.is_some() {
        out.push_str(SGR_RESET);
    }
    out
}

/// Remove `[start, end)` from every span, splitting spans that straddle the range.
fn cut_spans(spans: &mut Vec<ColorSpan>, start: usize, end: usize) {
    let mut kept = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        if span.end <= start || span.start >= end {
            kept.push(span);
            continue;
        }
        if span.start < start {
            kept.push(ColorSpan { end: start, ..span });
        }
        if span.end > end {
            kept.push(ColorSpan { start: end, ..span });
        }
    }
    *spans = kept;
}

/// Splice `text` into `line` (exactly `width` columns) at column `x`.
///
/// Wide glyphs of the parent cut by either edge of the inserted text become spaces so the
/// line keeps its width. Returns the new line and the number of columns written.
fn splice_line(line: &str, width: usize, x: usize, text: &str) -> (String, usize) {
    if x >= width {
        return (line.to_string(), 0);
    }
    let available = width - x;
    let text_width = plain_width(text).min(available);
    if text_width == 0 {
        return (line.to_string(), 0);
    }
    let inserted = fit_plain(&truncate_plain(text, available), text_width, ' ');
    let end = x + text_width;

    let mut out = String::with_capacity(line.len() + text.len());
    let mut column = 0;
    let mut placed = false;
    for grapheme in line.graphemes(true) {
        let w = grapheme_width(grapheme);
        let next = column + w;
        if next <= x {
            out.push_str(grapheme);
        } else if column < x {
            // Straddles the left edge.
            push_spaces(&mut out, x - column);
        }
        if !placed && next > x {
            out.push_str(&inserted);
            placed = true;
        }
        if column >= end {
            out.push_str(grapheme);
        } else if next > end {
            // Straddles the right edge.
            push_spaces(&mut out, next - end);
        }
        column = next;
    }
    if !placed {
        // The parent line was shorter than its width; pad up to `x` first.
        push_spaces(&mut out, x.saturating_sub(column));
        out.push_str(&inserted);
    }
    (out, text_width)
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}
