//! Platform-specific terminal integrations.

pub mod process_terminal;
pub mod stdin_buffer;

#[cfg(unix)]
pub use process_terminal::ProcessTerminal;
pub use stdin_buffer::{StdinDecoder, DEFAULT_ESCAPE_TIMEOUT};
