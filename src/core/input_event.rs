//! Events produced by the input decoder.

use std::fmt;

use crate::core::input::Key;

/// One decoded unit of terminal input.
///
/// Decode anomalies are surfaced as `UnknownSequence` / `UnknownByte` rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    FocusIn,
    FocusOut,
    /// A complete CSI sequence with no table entry.
    UnknownSequence(Vec<u8>),
    /// A byte that is not valid UTF-8 in its position.
    UnknownByte(u8),
}

impl InputEvent {
    pub fn key(&self) -> Option<&Key> {
        match self {
            InputEvent::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        InputEvent::Key(key)
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::Key(key) => write!(f, "{key}"),
            InputEvent::FocusIn => f.write_str("focus"),
            InputEvent::FocusOut => f.write_str("blur"),
            InputEvent::UnknownSequence(bytes) => {
                write!(f, "?CSI{:?}?", String::from_utf8_lossy(bytes.get(2..).unwrap_or(&[])))
            }
            InputEvent::UnknownByte(byte) => write!(f, "?{byte:#04x}?"),
        }
    }
}
