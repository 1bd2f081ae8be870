//! Text leaf.

use crate::core::component::Component;
use crate::core::style::{BorderKind, Color, Size, Spacing, Style};
use crate::core::text::ansi::strip_ansi;
use crate::core::text::utils::{fit_plain, truncate_plain};
use crate::core::text::width::plain_width;
use crate::render::buffer::RenderBuffer;
use crate::widgets::draw_chrome;

/// Fixed lines of text inside an optional border and padding.
///
/// Lines are split on `\n` only; content wider than the allotted box is truncated by
/// visual column, narrower content is padded with the style's fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    lines: Vec<String>,
    style: Style,
}

impl Text {
    pub fn new(content: impl AsRef<str>) -> Self {
        Self {
            lines: sanitize(content.as_ref()),
            style: Style::default(),
        }
    }

    pub fn set_content(&mut self, content: impl AsRef<str>) {
        self.lines = sanitize(content.as_ref());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn border(mut self, border: BorderKind) -> Self {
        self.style.border = border;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.style.border_color = Some(color);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.style.color = Some(color);
        self
    }

    pub fn padding(mut self, padding: Spacing) -> Self {
        self.style.padding = padding;
        self
    }

    pub fn fill(mut self, fill: char) -> Self {
        self.style.fill = fill;
        self
    }
}

impl Component for Text {
    fn min_size(&self) -> Size {
        let content_width = self.lines.iter().map(|line| plain_width(line)).max().unwrap_or(0);
        let chrome = self.style.chrome();
        Size::new(
            content_width + chrome.width,
            self.lines.len() + chrome.height,
        )
    }

    fn render_to_buffer(&self, size: Size) -> RenderBuffer {
        let (mut buffer, content) = draw_chrome(&self.style, size);
        if content.size.width == 0 {
            return buffer;
        }

        for (row, line) in self.lines.iter().take(content.size.height).enumerate() {
            let y = content.origin.y + row;
            let fitted = fit_plain(line, content.size.width, self.style.fill_char());
            buffer.write_at(y, content.origin.x, &fitted);
            if let Some(color) = self.style.color {
                let glyphs = plain_width(&truncate_plain(line, content.size.width));
                buffer.add_color(y, content.origin.x, content.origin.x + glyphs, color);
            }
        }
        buffer
    }

    fn style(&self) -> &Style {
        &self.style
    }
}

/// Split into lines, dropping escape sequences and control characters that would corrupt
/// column accounting. Tabs become four spaces.
fn sanitize(content: &str) -> Vec<String> {
    strip_ansi(content)
        .split('\n')
        .map(|line| {
            line.replace('\t', "    ")
                .chars()
                .filter(|ch| !ch.is_control())
                .collect()
        })
        .collect()
}
