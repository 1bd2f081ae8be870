//! Rendering pipeline: styled cell buffers and the diffing frame writer.

pub mod buffer;
pub mod renderer;

pub use buffer::{ColorSpan, RenderBuffer};
pub use renderer::DiffRenderer;
