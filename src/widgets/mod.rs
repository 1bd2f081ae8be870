//! Built-in components: a text leaf and a flexbox container.

pub mod flex;
pub mod text;

pub use flex::{FlexContainer, FlexItem};
pub use text::Text;

use crate::core::style::{Position, Size, Style, BORDER_HORIZONTAL, BORDER_VERTICAL};
use crate::render::buffer::RenderBuffer;

/// Area left for content once border and padding are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContentBox {
    pub origin: Position,
    pub size: Size,
}

/// Allocate a buffer of `size`, draw the style's border, and return the content box.
pub(crate) fn draw_chrome(style: &Style, size: Size) -> (RenderBuffer, ContentBox) {
    let mut buffer = RenderBuffer::new(size, style.fill_char());
    let mut origin = Position::default();
    let mut inner = size;

    if style.border.is_drawn() && size.width >= 2 && size.height >= 2 {
        let [top_left, top_right, bottom_left, bottom_right] = style.border.corners();
        let horizontal: String = std::iter::repeat(BORDER_HORIZONTAL)
            .take(size.width - 2)
            .collect();
        let last = size.height - 1;
        buffer.write_at(0, 0, &format!("{top_left}{horizontal}{top_right}"));
        buffer.write_at(last, 0, &format!("{bottom_left}{horizontal}{bottom_right}"));
        let side = BORDER_VERTICAL.to_string();
        for y in 1..last {
            buffer.write_at(y, 0, &side);
            buffer.write_at(y, size.width - 1, &side);
        }

        if let Some(color) = style.border_color {
            buffer.add_color(0, 0, size.width, color);
            buffer.add_color(last, 0, size.width, color);
            for y in 1..last {
                buffer.add_color(y, 0, 1, color);
                buffer.add_color(y, size.width - 1, size.width, color);
            }
        }

        origin = Position { x: 1, y: 1 };
        inner = Size::new(size.width - 2, size.height - 2);
    }

    let padding = style.padding;
    let content = ContentBox {
        origin: Position {
            x: origin.x + padding.left,
            y: origin.y + padding.top,
        },
        size: Size::new(
            inner.width.saturating_sub(padding.horizontal()),
            inner.height.saturating_sub(padding.vertical()),
        ),
    };
    (buffer, content)
}

#[cfg(test)]
mod tests {
    use super::draw_chrome;
    use crate::core::style::{BorderKind, Color, Position, Size, Spacing, Style};

    #[test]
    fn rounded_border_with_padding() {
        let style = Style {
            border: BorderKind::Rounded,
            border_color: Some(Color::Green),
            padding: Spacing::all(1),
            ..Style::default()
        };
        let (buffer, content) = draw_chrome(&style, Size::new(5, 4));
        assert_eq!(
            buffer.lines(),
            &[
                "╭───╮".to_string(),
                "│   │".to_string(),
                "│   │".to_string(),
                "╰───╯".to_string(),
            ]
        );
        assert_eq!(content.origin, Position { x: 2, y: 2 });
        assert_eq!(content.size, Size::new(1, 0));
        assert_eq!(buffer.spans(1).len(), 2);
    }

    #[test]
    fn tiny_box_skips_border() {
        let style = Style {
            border: BorderKind::Square,
            ..Style::default()
        };
        let (buffer, content) = draw_chrome(&style, Size::new(1, 1));
        assert_eq!(buffer.lines(), &[" ".to_string()]);
        assert_eq!(content.size, Size::new(1, 1));
    }
}
