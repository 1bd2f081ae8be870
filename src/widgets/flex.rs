//! Flexbox-style container.

use crate::core::component::Component;
use crate::core::style::{
    Align, BorderKind, Color, Direction, Justify, Position, Size, Spacing, Style,
};
use crate::render::buffer::RenderBuffer;
use crate::widgets::draw_chrome;

/// A child together with its per-child layout parameters.
pub struct FlexItem {
    pub component: Box<dyn Component>,
    /// Share of the main-axis free space this child absorbs; zero keeps its minimum.
    pub grow: usize,
}

impl FlexItem {
    pub fn new(component: impl Component + 'static) -> Self {
        Self {
            component: Box::new(component),
            grow: 0,
        }
    }

    pub fn grow(mut self, grow: usize) -> Self {
        self.grow = grow;
        self
    }
}

/// Where a child landed, relative to the container's content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    pub size: Size,
}

pub struct FlexContainer {
    children: Vec<FlexItem>,
    direction: Direction,
    justify: Justify,
    align: Align,
    style: Style,
}

impl Default for FlexContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl FlexContainer {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            direction: Direction::Row,
            justify: Justify::Start,
            align: Align::Start,
            style: Style::default(),
        }
    }

    pub fn row() -> Self {
        Self::new()
    }

    pub fn column() -> Self {
        Self::new().direction(Direction::Column)
    }

    pub fn child(mut self, component: impl Component + 'static) -> Self {
        self.children.push(FlexItem::new(component));
        self
    }

    pub fn grow_child(mut self, component: impl Component + 'static, grow: usize) -> Self {
        self.children.push(FlexItem::new(component).grow(grow));
        self
    }

    pub fn item(mut self, item: FlexItem) -> Self {
        self.children.push(item);
        self
    }

    pub fn push(&mut self, item: FlexItem) {
        self.children.push(item);
    }

    pub fn children(&self) -> &[FlexItem] {
        &self.children
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
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

    pub fn padding(mut self, padding: Spacing) -> Self {
        self.style.padding = padding;
        self
    }

    pub fn fill(mut self, fill: char) -> Self {
        self.style.fill = fill;
        self
    }

    fn main(&self, size: Size) -> usize {
        match self.direction {
            Direction::Row => size.width,
            Direction::Column => size.height,
        }
    }

    fn cross(&self, size: Size) -> usize {
        match self.direction {
            Direction::Row => size.height,
            Direction::Column => size.width,
        }
    }

    fn compose(&self, main: usize, cross: usize) -> Size {
        match self.direction {
            Direction::Row => Size::new(main, cross),
            Direction::Column => Size::new(cross, main),
        }
    }

    /// Size and position every child inside a content box of `content`.
    pub fn layout(&self, content: Size) -> Vec<Placement> {
        if self.children.is_empty() {
            return Vec::new();
        }

        let minima: Vec<Size> = self
            .children
            .iter()
            .map(|item| item.component.min_size())
            .collect();
        let available = self.main(content);
        let cross_extent = self.cross(content);

        let mut mains: Vec<usize> = minima.iter().map(|size| self.main(*size)).collect();
        let used: usize = mains.iter().sum();
        let grows: Vec<usize> = self.children.iter().map(|item| item.grow).collect();
        distribute_grow(&mut mains, &grows, available.saturating_sub(used));

        let count = self.children.len();
        let remaining = available.saturating_sub(mains.iter().sum());
        let (mut cursor, spacing) = match self.justify {
            Justify::Start => (0, 0),
            Justify::Center => (remaining / 2, 0),
            Justify::End => (remaining, 0),
            Justify::SpaceBetween if count >= 2 => (0, remaining / (count - 1)),
            Justify::SpaceBetween => (0, 0),
            Justify::SpaceAround => {
                let spacing = remaining / count;
                (spacing / 2, spacing)
            }
        };

        let mut placements = Vec::with_capacity(count);
        for (min, main) in minima.iter().zip(mains) {
            let child_cross = self.cross(*min);
            let (offset, cross) = match self.align {
                Align::Start => (0, child_cross),
                Align::Center => (cross_extent.saturating_sub(child_cross) / 2, child_cross),
                Align::End => (cross_extent.saturating_sub(child_cross), child_cross),
                Align::Stretch => (0, cross_extent),
            };
            let position = match self.direction {
                Direction::Row => Position { x: cursor, y: offset },
                Direction::Column => Position { x: offset, y: cursor },
            };
            placements.push(Placement {
                position,
                size: self.compose(main, cross),
            });
            cursor += main + spacing;
        }
        placements
    }
}

/// Hand `extra` cells to growing children in proportion to their grow factor.
///
/// Each child gets the floor of its share; the cells lost to rounding go one at a time to
/// growing children from first to last, so the free space is always used up exactly.
fn distribute_grow(mains: &mut [usize], grows: &[usize], extra: usize) {
    let total: usize = grows.iter().sum();
    if extra == 0 || total == 0 {
        return;
    }
    let mut handed = 0;
    for (main, grow) in mains.iter_mut().zip(grows) {
        let share = extra * grow / total;
        *main += share;
        handed += share;
    }
    let mut leftover = extra - handed;
    for (main, grow) in mains.iter_mut().zip(grows) {
        if leftover == 0 {
            break;
        }
        if *grow > 0 {
            *main += 1;
            leftover -= 1;
        }
    }
}

impl Component for FlexContainer {
    fn min_size(&self) -> Size {
        let chrome = self.style.chrome();
        if self.children.is_empty() {
            return Size::new(chrome.width.max(1), chrome.height.max(1));
        }

        let mut main = 0;
        let mut cross = 0;
        for item in &self.children {
            let size = item.component.min_size();
            main += self.main(size);
            cross = cross.max(self.cross(size));
        }
        let content = self.compose(main, cross);
        Size::new(content.width + chrome.width, content.height + chrome.height)
    }

    fn render_to_buffer(&self, size: Size) -> RenderBuffer {
        let (mut buffer, content) = draw_chrome(&self.style, size);

        for (item, placement) in self.children.iter().zip(self.layout(content.size)) {
            let Placement { position, size } = placement;
            if size.width == 0 || size.height == 0 {
                continue;
            }
            if position.x >= content.size.width || position.y >= content.size.height {
                continue;
            }
            let rendered = item.component.render_to_buffer(size);
            let visible = rendered.crop(Size::new(
                content.size.width - position.x,
                content.size.height - position.y,
            ));
            buffer.splice(
                &visible,
                Position {
                    x: content.origin.x + position.x,
                    y: content.origin.y + position.y,
                },
            );
        }
        buffer
    }

    fn style(&self) -> &Style {
        &self.style
    }
}
