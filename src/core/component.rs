//! Component trait.

use crate::core::style::{Size, Style};
use crate::render::buffer::RenderBuffer;

/// Renderable node of a view tree.
///
/// Layout is two-pass: parents ask children for their minimum size, then render each child
/// into a buffer of the size they settled on. A component must fill exactly the size it is
/// given (truncating or padding), so parents can splice buffers without re-measuring.
pub trait Component {
    /// Smallest size the component can render into without losing content.
    fn min_size(&self) -> Size;

    /// Render plain text plus color spans at exactly `size`.
    fn render_to_buffer(&self, size: Size) -> RenderBuffer;

    fn style(&self) -> &Style;

    /// Render straight to colored lines.
    fn render(&self, size: Size) -> Vec<String> {
        self.render_to_buffer(size).to_lines()
    }
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn min_size(&self) -> Size {
        (**self).min_size()
    }

    fn render_to_buffer(&self, size: Size) -> RenderBuffer {
        (**self).render_to_buffer(size)
    }

    fn style(&self) -> &Style {
        (**self).style()
    }
}
