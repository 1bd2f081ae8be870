//! Reactive model-update-view toolkit for inline terminal UIs.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Implement [`Model`] and drive it with [`Program`]; control a running program through
//!   [`ProgramHandle`].
//! - Return [`Cmd`]s from `init`/`update` for async or blocking work, declare [`Sub`]s for
//!   long-lived sources.
//! - Build views from [`Text`] leaves and [`FlexContainer`] branches; colors are carried as
//!   spans until the final frame is produced.
//! - Decode raw terminal bytes with [`StdinDecoder`] and match keys by [`Key`] display name.
//! - Use text and width helpers for ANSI-safe formatting.

#![allow(clippy::needless_range_loop, clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

pub use crate::error::{Error, Result};

/// Runtime types.
pub use crate::runtime::{
    Cmd, Event, Message, Model, Program, ProgramHandle, ProgramOptions, ProgramState, Sender,
    Sub,
};

/// Built-in UI components.
pub use crate::widgets::{FlexContainer, FlexItem, Text};

/// Component trait and layout/style vocabulary.
pub use crate::core::component::Component;
pub use crate::core::style::{
    Align, BorderKind, Color, Direction, Justify, Position, Size, Spacing, Style,
};

/// Keyboard input types and decoding.
pub use crate::core::input::{Key, KeyType};
pub use crate::core::input_event::InputEvent;
pub use crate::platform::stdin_buffer::StdinDecoder;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::{StartOptions, Terminal, TerminalGuard, TerminalSignal};
#[cfg(unix)]
pub use crate::platform::process_terminal::ProcessTerminal;

/// Render-layer types.
pub use crate::render::{ColorSpan, DiffRenderer, RenderBuffer};

/// ANSI stripping helper.
pub use crate::core::text::ansi::strip_ansi;
/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
