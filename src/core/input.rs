//! Key types and the escape-sequence table used by the input decoder.

use std::collections::{HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;

/// Named key kinds. `Runes` carries printable text in [`Key::runes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Runes,
    Null,
    /// Ctrl plus a letter (`a`..=`z`) or one of `\`, `]`, `^`, `_`.
    Ctrl(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Space,
    Up,
    Down,
    Right,
    Left,
    ShiftUp,
    ShiftDown,
    ShiftRight,
    ShiftLeft,
    CtrlUp,
    CtrlDown,
    CtrlRight,
    CtrlLeft,
    CtrlShiftUp,
    CtrlShiftDown,
    CtrlShiftRight,
    CtrlShiftLeft,
    ShiftTab,
    Home,
    End,
    ShiftHome,
    ShiftEnd,
    CtrlHome,
    CtrlEnd,
    PageUp,
    PageDown,
    CtrlPageUp,
    CtrlPageDown,
    Insert,
    Delete,
    ShiftDelete,
    CtrlDelete,
    /// Function keys F1..=F20.
    F(u8),
}

impl KeyType {
    /// Key for a raw control byte (`< 0x20` or `0x7f`). Returns `None` for printable bytes.
    pub fn from_control_byte(byte: u8) -> Option<Self> {
        let key = match byte {
            0x00 => KeyType::Null,
            0x08 | 0x7f => KeyType::Backspace,
            0x09 => KeyType::Tab,
            0x0a | 0x0d => KeyType::Enter,
            0x1b => KeyType::Escape,
            0x01..=0x1a => KeyType::Ctrl((b'a' + byte - 1) as char),
            0x1c => KeyType::Ctrl('\\'),
            0x1d => KeyType::Ctrl(']'),
            0x1e => KeyType::Ctrl('^'),
            0x1f => KeyType::Ctrl('_'),
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Runes => "runes",
            KeyType::Null => "ctrl+@",
            KeyType::Ctrl(ch) => return write!(f, "ctrl+{ch}"),
            KeyType::Enter => "enter",
            KeyType::Tab => "tab",
            KeyType::Backspace => "backspace",
            KeyType::Escape => "esc",
            KeyType::Space => "space",
            KeyType::Up => "up",
            KeyType::Down => "down",
            KeyType::Right => "right",
            KeyType::Left => "left",
            KeyType::ShiftUp => "shift+up",
            KeyType::ShiftDown => "shift+down",
            KeyType::ShiftRight => "shift+right",
            KeyType::ShiftLeft => "shift+left",
            KeyType::CtrlUp => "ctrl+up",
            KeyType::CtrlDown => "ctrl+down",
            KeyType::CtrlRight => "ctrl+right",
            KeyType::CtrlLeft => "ctrl+left",
            KeyType::CtrlShiftUp => "ctrl+shift+up",
            KeyType::CtrlShiftDown => "ctrl+shift+down",
            KeyType::CtrlShiftRight => "ctrl+shift+right",
            KeyType::CtrlShiftLeft => "ctrl+shift+left",
            KeyType::ShiftTab => "shift+tab",
            KeyType::Home => "home",
            KeyType::End => "end",
            KeyType::ShiftHome => "shift+home",
            KeyType::ShiftEnd => "shift+end",
            KeyType::CtrlHome => "ctrl+home",
            KeyType::CtrlEnd => "ctrl+end",
            KeyType::PageUp => "pgup",
            KeyType::PageDown => "pgdown",
            KeyType::CtrlPageUp => "ctrl+pgup",
            KeyType::CtrlPageDown => "ctrl+pgdown",
            KeyType::Insert => "insert",
            KeyType::Delete => "delete",
            KeyType::ShiftDelete => "shift+delete",
            KeyType::CtrlDelete => "ctrl+delete",
            KeyType::F(n) => return write!(f, "f{n}"),
        };
        f.write_str(name)
    }
}

/// A decoded key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub key_type: KeyType,
    /// Text for `Runes` keys (and the literal space for `Space`).
    pub runes: Vec<char>,
    pub alt: bool,
    /// Set when the runes arrived inside a bracketed paste.
    pub paste: bool,
}

impl Key {
    pub fn new(key_type: KeyType) -> Self {
        let runes = if key_type == KeyType::Space {
            vec![' ']
        } else {
            Vec::new()
        };
        Self {
            key_type,
            runes,
            alt: false,
            paste: false,
        }
    }

    pub fn runes(text: &str) -> Self {
        Self {
            key_type: KeyType::Runes,
            runes: text.chars().collect(),
            alt: false,
            paste: false,
        }
    }

    pub fn pasted(text: &str) -> Self {
        Self {
            paste: true,
            ..Self::runes(text)
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Runes as a string; empty for named keys.
    pub fn text(&self) -> String {
        self.runes.iter().collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alt {
            f.write_str("alt+")?;
        }
        match self.key_type {
            KeyType::Runes if self.paste => write!(f, "[{}]", self.text()),
            KeyType::Runes => f.write_str(&self.text()),
            other => write!(f, "{other}"),
        }
    }
}

/// What a table sequence decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Key { key_type: KeyType, alt: bool },
    FocusIn,
    FocusOut,
}

const fn key(key_type: KeyType) -> Sequence {
    Sequence::Key {
        key_type,
        alt: false,
    }
}

const fn alt(key_type: KeyType) -> Sequence {
    Sequence::Key {
        key_type,
        alt: true,
    }
}

pub const BRACKETED_PASTE_START: &[u8] = b"\x1b[200~";
pub const BRACKETED_PASTE_END: &[u8] = b"\x1b[201~";

/// Escape sequences emitted by common terminals (xterm, VT220, urxvt, linux console).
pub const SEQUENCE_TABLE: &[(&str, Sequence)] = &[
    // Arrows, CSI and SS3 forms.
    ("\x1b[A", key(KeyType::Up)),
    ("\x1b[B", key(KeyType::Down)),
    ("\x1b[C", key(KeyType::Right)),
    ("\x1b[D", key(KeyType::Left)),
    ("\x1bOA", key(KeyType::Up)),
    ("\x1bOB", key(KeyType::Down)),
    ("\x1bOC", key(KeyType::Right)),
    ("\x1bOD", key(KeyType::Left)),
    ("\x1b[1;2A", key(KeyType::ShiftUp)),
    ("\x1b[1;2B", key(KeyType::ShiftDown)),
    ("\x1b[1;2C", key(KeyType::ShiftRight)),
    ("\x1b[1;2D", key(KeyType::ShiftLeft)),
    ("\x1b[a", key(KeyType::ShiftUp)),
    ("\x1b[b", key(KeyType::ShiftDown)),
    ("\x1b[c", key(KeyType::ShiftRight)),
    ("\x1b[d", key(KeyType::ShiftLeft)),
    ("\x1b[1;3A", alt(KeyType::Up)),
    ("\x1b[1;3B", alt(KeyType::Down)),
    ("\x1b[1;3C", alt(KeyType::Right)),
    ("\x1b[1;3D", alt(KeyType::Left)),
    ("\x1b[1;4A", alt(KeyType::ShiftUp)),
    ("\x1b[1;4B", alt(KeyType::ShiftDown)),
    ("\x1b[1;4C", alt(KeyType::ShiftRight)),
    ("\x1b[1;4D", alt(KeyType::ShiftLeft)),
    ("\x1b[1;5A", key(KeyType::CtrlUp)),
    ("\x1b[1;5B", key(KeyType::CtrlDown)),
    ("\x1b[1;5C", key(KeyType::CtrlRight)),
    ("\x1b[1;5D", key(KeyType::CtrlLeft)),
    ("\x1bOa", key(KeyType::CtrlUp)),
    ("\x1bOb", key(KeyType::CtrlDown)),
    ("\x1bOc", key(KeyType::CtrlRight)),
    ("\x1bOd", key(KeyType::CtrlLeft)),
    ("\x1b[1;6A", key(KeyType::CtrlShiftUp)),
    ("\x1b[1;6B", key(KeyType::CtrlShiftDown)),
    ("\x1b[1;6C", key(KeyType::CtrlShiftRight)),
    ("\x1b[1;6D", key(KeyType::CtrlShiftLeft)),
    ("\x1b[1;7A", alt(KeyType::CtrlUp)),
    ("\x1b[1;7B", alt(KeyType::CtrlDown)),
    ("\x1b[1;7C", alt(KeyType::CtrlRight)),
    ("\x1b[1;7D", alt(KeyType::CtrlLeft)),
    ("\x1b[1;8A", alt(KeyType::CtrlShiftUp)),
    ("\x1b[1;8B", alt(KeyType::CtrlShiftDown)),
    ("\x1b[1;8C", alt(KeyType::CtrlShiftRight)),
    ("\x1b[1;8D", alt(KeyType::CtrlShiftLeft)),
    // Navigation.
    ("\x1b[Z", key(KeyType::ShiftTab)),
    ("\x1b[2~", key(KeyType::Insert)),
    ("\x1b[3;2~", key(KeyType::ShiftDelete)),
    ("\x1b[3;3~", alt(KeyType::Delete)),
    ("\x1b[3;5~", key(KeyType::CtrlDelete)),
    ("\x1b[3~", key(KeyType::Delete)),
    ("\x1b[5~", key(KeyType::PageUp)),
    ("\x1b[5;3~", alt(KeyType::PageUp)),
    ("\x1b[5;5~", key(KeyType::CtrlPageUp)),
    ("\x1b[6~", key(KeyType::PageDown)),
    ("\x1b[6;3~", alt(KeyType::PageDown)),
    ("\x1b[6;5~", key(KeyType::CtrlPageDown)),
    ("\x1b[1~", key(KeyType::Home)),
    ("\x1b[H", key(KeyType::Home)),
    ("\x1bOH", key(KeyType::Home)),
    ("\x1b[7~", key(KeyType::Home)),
    ("\x1b[1;3H", alt(KeyType::Home)),
    ("\x1b[1;5H", key(KeyType::CtrlHome)),
    ("\x1b[1;2H", key(KeyType::ShiftHome)),
    ("\x1b[4~", key(KeyType::End)),
    ("\x1b[F", key(KeyType::End)),
    ("\x1bOF", key(KeyType::End)),
    ("\x1b[8~", key(KeyType::End)),
    ("\x1b[1;3F", alt(KeyType::End)),
    ("\x1b[1;5F", key(KeyType::CtrlEnd)),
    ("\x1b[1;2F", key(KeyType::ShiftEnd)),
    // Function keys.
    ("\x1bOP", key(KeyType::F(1))),
    ("\x1bOQ", key(KeyType::F(2))),
    ("\x1bOR", key(KeyType::F(3))),
    ("\x1bOS", key(KeyType::F(4))),
    ("\x1b[11~", key(KeyType::F(1))),
    ("\x1b[12~", key(KeyType::F(2))),
    ("\x1b[13~", key(KeyType::F(3))),
    ("\x1b[14~", key(KeyType::F(4))),
    ("\x1b[[A", key(KeyType::F(1))),
    ("\x1b[[B", key(KeyType::F(2))),
    ("\x1b[[C", key(KeyType::F(3))),
    ("\x1b[[D", key(KeyType::F(4))),
    ("\x1b[[E", key(KeyType::F(5))),
    ("\x1b[15~", key(KeyType::F(5))),
    ("\x1b[17~", key(KeyType::F(6))),
    ("\x1b[18~", key(KeyType::F(7))),
    ("\x1b[19~", key(KeyType::F(8))),
    ("\x1b[20~", key(KeyType::F(9))),
    ("\x1b[21~", key(KeyType::F(10))),
    ("\x1b[23~", key(KeyType::F(11))),
    ("\x1b[24~", key(KeyType::F(12))),
    ("\x1b[25~", key(KeyType::F(13))),
    ("\x1b[26~", key(KeyType::F(14))),
    ("\x1b[28~", key(KeyType::F(15))),
    ("\x1b[29~", key(KeyType::F(16))),
    ("\x1b[31~", key(KeyType::F(17))),
    ("\x1b[32~", key(KeyType::F(18))),
    ("\x1b[33~", key(KeyType::F(19))),
    ("\x1b[34~", key(KeyType::F(20))),
    ("\x1b[1;3P", alt(KeyType::F(1))),
    ("\x1b[1;3Q", alt(KeyType::F(2))),
    ("\x1b[1;3R", alt(KeyType::F(3))),
    ("\x1b[1;3S", alt(KeyType::F(4))),
    // Focus reporting.
    ("\x1b[I", Sequence::FocusIn),
    ("\x1b[O", Sequence::FocusOut),
];

/// Lookup form of [`SEQUENCE_TABLE`].
pub static SEQUENCES: Lazy<HashMap<&'static [u8], Sequence>> = Lazy::new(|| {
    SEQUENCE_TABLE
        .iter()
        .map(|(seq, decoded)| (seq.as_bytes(), *decoded))
        .collect()
});

/// Every strict prefix of a table entry or a paste marker.
static SEQUENCE_PREFIXES: Lazy<HashSet<&'static [u8]>> = Lazy::new(|| {
    let mut prefixes = HashSet::new();
    let entries = SEQUENCE_TABLE
        .iter()
        .map(|(seq, _)| seq.as_bytes())
        .chain([BRACKETED_PASTE_START, BRACKETED_PASTE_END]);
    for seq in entries {
        for end in 1..seq.len() {
            prefixes.insert(&seq[..end]);
        }
    }
    prefixes
});

static LONGEST_SEQUENCE: Lazy<usize> = Lazy::new(|| {
    SEQUENCE_TABLE
        .iter()
        .map(|(seq, _)| seq.len())
        .max()
        .unwrap_or(0)
});

/// Longest table entry that `data` starts with, and its byte length.
pub fn match_sequence(data: &[u8]) -> Option<(Sequence, usize)> {
    let max = (*LONGEST_SEQUENCE).min(data.len());
    (2..=max)
        .rev()
        .find_map(|len| SEQUENCES.get(&data[..len]).map(|decoded| (*decoded, len)))
}

/// True when `data` could still grow into a table entry or paste marker.
pub fn is_sequence_prefix(data: &[u8]) -> bool {
    SEQUENCE_PREFIXES.contains(data)
}

#[cfg(test)]
mod tests {
    use super::{is_sequence_prefix, match_sequence, Key, KeyType, Sequence, SEQUENCE_TABLE};

    #[test]
    fn control_bytes_map_to_named_keys() {
        assert_eq!(KeyType::from_control_byte(3), Some(KeyType::Ctrl('c')));
        assert_eq!(KeyType::from_control_byte(4), Some(KeyType::Ctrl('d')));
        assert_eq!(KeyType::from_control_byte(13), Some(KeyType::Enter));
        assert_eq!(KeyType::from_control_byte(10), Some(KeyType::Enter));
        assert_eq!(KeyType::from_control_byte(127), Some(KeyType::Backspace));
        assert_eq!(KeyType::from_control_byte(8), Some(KeyType::Backspace));
        assert_eq!(KeyType::from_control_byte(9), Some(KeyType::Tab));
        assert_eq!(KeyType::from_control_byte(27), Some(KeyType::Escape));
        assert_eq!(KeyType::from_control_byte(0x1f), Some(KeyType::Ctrl('_')));
        assert_eq!(KeyType::from_control_byte(b'a'), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Key::new(KeyType::Ctrl('c')).to_string(), "ctrl+c");
        assert_eq!(Key::runes("a").with_alt().to_string(), "alt+a");
        assert_eq!(Key::new(KeyType::ShiftTab).to_string(), "shift+tab");
        assert_eq!(Key::new(KeyType::F(5)).to_string(), "f5");
        assert_eq!(Key::pasted("hi there").to_string(), "[hi there]");
        assert_eq!(Key::new(KeyType::Space).to_string(), "space");
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(
            match_sequence(b"\x1b[1;5Arest"),
            Some((
                Sequence::Key {
                    key_type: KeyType::CtrlUp,
                    alt: false
                },
                6
            ))
        );
        assert_eq!(match_sequence(b"\x1b[I"), Some((Sequence::FocusIn, 3)));
        assert_eq!(match_sequence(b"\x1b[9"), None);
    }

    #[test]
    fn prefixes_cover_every_entry() {
        for (seq, _) in SEQUENCE_TABLE {
            let bytes = seq.as_bytes();
            for end in 1..bytes.len() {
                assert!(is_sequence_prefix(&bytes[..end]), "{seq:?} at {end}");
            }
            assert!(!is_sequence_prefix(bytes) || SEQUENCE_TABLE.iter().any(|(other, _)| {
                other.len() > bytes.len() && other.as_bytes().starts_with(bytes)
            }));
        }
        assert!(is_sequence_prefix(b"\x1b[20"));
    }
}
