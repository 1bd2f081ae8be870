//! Chunked stdin decoding.
//!
//! Bytes arrive in arbitrary chunks; anything that could still grow into a known sequence
//! (or a multi-byte rune) is held back until the next chunk or until the escape timeout
//! expires, at which point it is decoded as-is.

use std::time::{Duration, Instant};

use crate::core::input::{
    is_sequence_prefix, match_sequence, Key, KeyType, Sequence, BRACKETED_PASTE_END,
    BRACKETED_PASTE_START,
};
use crate::core::input_event::InputEvent;

const ESC: u8 = 0x1b;

pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

/// Quiet time after which an unterminated paste is delivered as-is.
pub const PASTE_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Paste content beyond this is delivered early and decoding resumes.
pub const MAX_PASTE_BYTES: usize = 1 << 20;

/// Outcome of decoding one unit at the head of the buffer.
enum Step {
    /// Bytes consumed and the events they produced.
    Emit(usize, Vec<InputEvent>),
    /// More data is needed before this unit can be decided.
    Wait,
}

enum Paste {
    Done(usize, InputEvent),
    Pending(usize),
}

enum Rune {
    Char(char, usize),
    Incomplete,
    Invalid,
}

/// Stateful byte-to-event decoder.
pub struct StdinDecoder {
    buffer: Vec<u8>,
    timeout: Duration,
    paste: Option<Vec<u8>>,
    flush_deadline: Option<Instant>,
}

impl Default for StdinDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE_TIMEOUT)
    }
}

impl StdinDecoder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffer: Vec::new(),
            timeout,
            paste: None,
            flush_deadline: None,
        }
    }

    /// Feed one chunk and return every event it completes.
    pub fn process(&mut self, data: &[u8]) -> Vec<InputEvent> {
        self.flush_deadline = None;
        self.buffer.extend_from_slice(data);
        let events = self.drain(false);
        if self.paste.is_some() {
            self.flush_deadline = Some(Instant::now() + self.timeout.max(PASTE_IDLE_TIMEOUT));
        } else if !self.buffer.is_empty() {
            self.flush_deadline = Some(Instant::now() + self.timeout);
        }
        events
    }

    /// Decode held-back bytes once their deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<InputEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Decode everything still buffered, including an unterminated paste.
    pub fn flush(&mut self) -> Vec<InputEvent> {
        self.flush_deadline = None;
        let mut events = self.drain(true);
        if let Some(mut pasted) = self.paste.take() {
            pasted.append(&mut self.buffer);
            events.push(InputEvent::Key(Key::pasted(&String::from_utf8_lossy(&pasted))));
        }
        events
    }

    /// How long the reader may block before `flush_due` has work to do.
    pub fn next_timeout(&self, now: Instant, default: Duration) -> Duration {
        match self.flush_deadline {
            Some(deadline) => deadline.saturating_duration_since(now).min(default),
            None => default,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || self.paste.is_some()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.paste = None;
        self.flush_deadline = None;
    }

    fn drain(&mut self, force: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.buffer.len() {
            if self.paste.is_some() {
                match self.drain_paste(pos) {
                    Paste::Done(consumed, event) => {
                        events.push(event);
                        pos += consumed;
                        continue;
                    }
                    Paste::Pending(consumed) => {
                        pos += consumed;
                        break;
                    }
                }
            }

            let rest = &self.buffer[pos..];
            if rest.starts_with(BRACKETED_PASTE_START) {
                self.paste = Some(Vec::new());
                pos += BRACKETED_PASTE_START.len();
                continue;
            }

            match decode_unit(rest, force) {
                Step::Emit(consumed, produced) => {
                    events.extend(produced);
                    pos += consumed;
                }
                Step::Wait => break,
            }
        }
        self.buffer.drain(..pos);
        events
    }

    /// Move paste content out of the buffer, keeping back only a possible partial end marker.
    fn drain_paste(&mut self, pos: usize) -> Paste {
        let rest = &self.buffer[pos..];
        let pasted = self.paste.get_or_insert_with(Vec::new);
        if let Some(end) = find(rest, BRACKETED_PASTE_END) {
            pasted.extend_from_slice(&rest[..end]);
            let text = String::from_utf8_lossy(pasted).into_owned();
            self.paste = None;
            return Paste::Done(end + BRACKETED_PASTE_END.len(), InputEvent::Key(Key::pasted(&text)));
        }

        let keep = partial_suffix(rest, BRACKETED_PASTE_END);
        pasted.extend_from_slice(&rest[..rest.len() - keep]);
        if pasted.len() >= MAX_PASTE_BYTES {
            let text = String::from_utf8_lossy(pasted).into_owned();
            self.paste = None;
            return Paste::Done(rest.len() - keep, InputEvent::Key(Key::pasted(&text)));
        }
        Paste::Pending(rest.len() - keep)
    }
}

fn decode_unit(rest: &[u8], force: bool) -> Step {
    let first = rest[0];
    if first == ESC {
        return decode_escape(rest, force);
    }
    if first == b' ' {
        return Step::Emit(1, vec![InputEvent::Key(Key::new(KeyType::Space))]);
    }
    if let Some(key_type) = KeyType::from_control_byte(first) {
        return Step::Emit(1, vec![InputEvent::Key(Key::new(key_type))]);
    }
    decode_runes(rest, force)
}

fn decode_escape(rest: &[u8], force: bool) -> Step {
    if let Some((sequence, len)) = match_sequence(rest) {
        return Step::Emit(len, vec![sequence_event(sequence, false)]);
    }

    if !force && is_sequence_prefix(rest) {
        return Step::Wait;
    }

    if let Some(len) = csi_length(rest) {
        return Step::Emit(len, vec![InputEvent::UnknownSequence(rest[..len].to_vec())]);
    }
    if !force && is_incomplete_csi(rest) {
        return Step::Wait;
    }

    if rest.len() == 1 {
        return if force {
            Step::Emit(1, vec![InputEvent::Key(Key::new(KeyType::Escape))])
        } else {
            Step::Wait
        };
    }

    // ESC followed by another key: that key with alt held.
    let after = &rest[1..];
    if after[0] == ESC {
        if let Some((sequence, len)) = match_sequence(after) {
            return Step::Emit(1 + len, vec![sequence_event(sequence, true)]);
        }
        if !force && is_sequence_prefix(after) {
            return Step::Wait;
        }
        return Step::Emit(2, vec![InputEvent::Key(Key::new(KeyType::Escape).with_alt())]);
    }
    if let Some(key_type) = KeyType::from_control_byte(after[0]) {
        return Step::Emit(2, vec![InputEvent::Key(Key::new(key_type).with_alt())]);
    }
    if after[0] == b' ' {
        return Step::Emit(2, vec![InputEvent::Key(Key::new(KeyType::Space).with_alt())]);
    }
    match decode_rune(after) {
        Rune::Char(ch, len) => {
            let key = Key {
                runes: vec![ch],
                ..Key::new(KeyType::Runes)
            };
            Step::Emit(1 + len, vec![InputEvent::Key(key.with_alt())])
        }
        Rune::Incomplete if !force => Step::Wait,
        Rune::Incomplete | Rune::Invalid => Step::Emit(
            2,
            vec![
                InputEvent::Key(Key::new(KeyType::Escape)),
                InputEvent::UnknownByte(after[0]),
            ],
        ),
    }
}

/// Coalesce consecutive printable runes into a single `Runes` key.
fn decode_runes(rest: &[u8], force: bool) -> Step {
    let mut runes = Vec::new();
    let mut pos = 0;
    while pos < rest.len() {
        let byte = rest[pos];
        if byte == ESC || byte == b' ' || KeyType::from_control_byte(byte).is_some() {
            break;
        }
        match decode_rune(&rest[pos..]) {
            Rune::Char(ch, len) => {
                runes.push(ch);
                pos += len;
            }
            Rune::Incomplete if !force => {
                if runes.is_empty() {
                    return Step::Wait;
                }
                break;
            }
            Rune::Incomplete | Rune::Invalid => {
                if runes.is_empty() {
                    return Step::Emit(1, vec![InputEvent::UnknownByte(byte)]);
                }
                break;
            }
        }
    }

    let key = Key {
        runes,
        ..Key::new(KeyType::Runes)
    };
    Step::Emit(pos, vec![InputEvent::Key(key)])
}

fn decode_rune(data: &[u8]) -> Rune {
    let width = match data[0] {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return Rune::Invalid,
    };
    if data.len() < width {
        // Only wait when what has arrived so far is a valid start.
        if data[1..].iter().all(|b| (0x80..=0xbf).contains(b)) {
            return Rune::Incomplete;
        }
        return Rune::Invalid;
    }
    match std::str::from_utf8(&data[..width]) {
        Ok(text) => match text.chars().next() {
            Some(ch) => Rune::Char(ch, width),
            None => Rune::Invalid,
        },
        Err(_) => Rune::Invalid,
    }
}

fn sequence_event(sequence: Sequence, extra_alt: bool) -> InputEvent {
    match sequence {
        Sequence::Key { key_type, alt } => {
            let mut key = Key::new(key_type);
            key.alt = alt || extra_alt;
            InputEvent::Key(key)
        }
        Sequence::FocusIn => InputEvent::FocusIn,
        Sequence::FocusOut => InputEvent::FocusOut,
    }
}

/// Length of a complete CSI sequence (`ESC [ params intermediates final`) at the head of `data`.
fn csi_length(data: &[u8]) -> Option<usize> {
    if data.len() < 3 || data[0] != ESC || data[1] != b'[' {
        return None;
    }
    for (idx, byte) in data.iter().enumerate().skip(2) {
        match byte {
            0x20..=0x3f => continue,
            0x40..=0x7e => return Some(idx + 1),
            _ => return None,
        }
    }
    None
}

fn is_incomplete_csi(data: &[u8]) -> bool {
    data.len() >= 2
        && data[0] == ESC
        && data[1] == b'['
        && data[2..].iter().all(|b| (0x20..=0x3f).contains(b))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Length of the longest suffix of `data` that is a strict prefix of `marker`.
fn partial_suffix(data: &[u8], marker: &[u8]) -> usize {
    let max = (marker.len() - 1).min(data.len());
    (1..=max)
        .rev()
        .find(|&len| data.ends_with(&marker[..len]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{StdinDecoder, MAX_PASTE_BYTES, PASTE_IDLE_TIMEOUT};
    use crate::core::input::{Key, KeyType, SEQUENCE_TABLE};
    use crate::core::input_event::InputEvent;
    use std::time::{Duration, Instant};

    fn key(key_type: KeyType) -> InputEvent {
        InputEvent::Key(Key::new(key_type))
    }

    fn decode_all(chunks: &[&[u8]]) -> Vec<InputEvent> {
        let mut decoder = StdinDecoder::new(Duration::from_millis(10));
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.process(chunk));
        }
        events.extend(decoder.flush());
        events
    }

    #[test]
    fn arrow_in_one_read() {
        assert_eq!(decode_all(&[b"\x1b[A"]), vec![key(KeyType::Up)]);
    }

    #[test]
    fn escape_then_rest_of_arrow() {
        let mut decoder = StdinDecoder::default();
        assert!(decoder.process(b"\x1b").is_empty());
        assert_eq!(decoder.process(b"[A"), vec![key(KeyType::Up)]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn every_table_sequence_survives_any_split() {
        for (seq, _) in SEQUENCE_TABLE {
            let bytes = seq.as_bytes();
            let whole = decode_all(&[bytes]);
            assert_eq!(whole.len(), 1, "{seq:?}");
            for split in 1..bytes.len() {
                let (head, tail) = bytes.split_at(split);
                let mut decoder = StdinDecoder::default();
                let mut events = decoder.process(head);
                events.extend(decoder.process(tail));
                assert_eq!(events, whole, "{seq:?} split at {split}");
            }
        }
    }

    #[test]
    fn lone_escape_waits_for_timeout() {
        let mut decoder = StdinDecoder::new(Duration::from_millis(25));
        assert!(decoder.process(b"\x1b").is_empty());
        let now = Instant::now();
        assert!(decoder.next_timeout(now, Duration::from_secs(1)) <= Duration::from_millis(25));
        assert!(decoder.flush_due(now).is_empty());
        let flushed = decoder.flush_due(now + Duration::from_millis(50));
        assert_eq!(flushed, vec![key(KeyType::Escape)]);
        assert!(decoder.flush_due(now + Duration::from_millis(100)).is_empty());
    }

    #[test]
    fn alt_modifies_following_key() {
        assert_eq!(
            decode_all(&[b"\x1ba"]),
            vec![InputEvent::Key(Key::runes("a").with_alt())]
        );
        assert_eq!(
            decode_all(&[b"\x1b\x1b[A"]),
            vec![InputEvent::Key(Key::new(KeyType::Up).with_alt())]
        );
        assert_eq!(
            decode_all(&[b"\x1b\x03"]),
            vec![InputEvent::Key(Key::new(KeyType::Ctrl('c')).with_alt())]
        );
    }

    #[test]
    fn printable_runes_coalesce() {
        assert_eq!(
            decode_all(&[b"hello world"]),
            vec![
                InputEvent::Key(Key::runes("hello")),
                key(KeyType::Space),
                InputEvent::Key(Key::runes("world")),
            ]
        );
    }

    #[test]
    fn multibyte_rune_split_across_reads() {
        let bytes = "日".as_bytes();
        assert_eq!(
            decode_all(&[&bytes[..1], &bytes[1..]]),
            vec![InputEvent::Key(Key::runes("日"))]
        );
    }

    #[test]
    fn control_bytes_are_named_keys() {
        assert_eq!(
            decode_all(&[b"\x03\r\t\x7f"]),
            vec![
                key(KeyType::Ctrl('c')),
                key(KeyType::Enter),
                key(KeyType::Tab),
                key(KeyType::Backspace),
            ]
        );
    }

    #[test]
    fn unknown_csi_is_reported() {
        assert_eq!(
            decode_all(&[b"\x1b[99zq"]),
            vec![
                InputEvent::UnknownSequence(b"\x1b[99z".to_vec()),
                InputEvent::Key(Key::runes("q")),
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_reported() {
        assert_eq!(
            decode_all(&[b"a\xffb"]),
            vec![
                InputEvent::Key(Key::runes("a")),
                InputEvent::UnknownByte(0xff),
                InputEvent::Key(Key::runes("b")),
            ]
        );
    }

    #[test]
    fn focus_events() {
        assert_eq!(
            decode_all(&[b"\x1b[I\x1b[O"]),
            vec![InputEvent::FocusIn, InputEvent::FocusOut]
        );
    }

    #[test]
    fn bracketed_paste_across_chunks() {
        let events = decode_all(&[b"x\x1b[200~he", b"llo\x1b[2", b"01~y"]);
        assert_eq!(
            events,
            vec![
                InputEvent::Key(Key::runes("x")),
                InputEvent::Key(Key::pasted("hello")),
                InputEvent::Key(Key::runes("y")),
            ]
        );
    }

    #[test]
    fn paste_keeps_control_characters() {
        let events = decode_all(&[b"\x1b[200~a\nb\x1b[201~"]);
        assert_eq!(events, vec![InputEvent::Key(Key::pasted("a\nb"))]);
    }

    #[test]
    fn unterminated_paste_is_delivered_after_idle_timeout() {
        let mut decoder = StdinDecoder::default();
        assert!(decoder.process(b"\x1b[200~abc").is_empty());
        assert!(decoder.process(b"q").is_empty());
        let now = Instant::now();
        assert!(decoder.next_timeout(now, Duration::from_secs(5)) <= PASTE_IDLE_TIMEOUT);
        assert!(decoder.flush_due(now).is_empty());

        let flushed = decoder.flush_due(now + PASTE_IDLE_TIMEOUT);
        assert_eq!(flushed, vec![InputEvent::Key(Key::pasted("abcq"))]);
        assert!(!decoder.has_pending());
        assert_eq!(decoder.process(b"\x03"), vec![key(KeyType::Ctrl('c'))]);
    }

    #[test]
    fn oversized_paste_is_delivered_early() {
        let mut decoder = StdinDecoder::default();
        let mut data = b"\x1b[200~".to_vec();
        data.resize(data.len() + MAX_PASTE_BYTES, b'x');
        let events = decoder.process(&data);
        assert_eq!(events.len(), 1);
        match &events[0] {
            InputEvent::Key(key) => assert!(key.paste),
            other => panic!("expected pasted key, got {other:?}"),
        }
        assert_eq!(decoder.process(b"q"), vec![InputEvent::Key(Key::runes("q"))]);
    }

    #[test]
    fn clear_drops_pending_state() {
        let mut decoder = StdinDecoder::default();
        assert!(decoder.process(b"\x1b[1;").is_empty());
        decoder.clear();
        assert!(!decoder.has_pending());
        assert_eq!(
            decoder.next_timeout(Instant::now(), Duration::from_millis(77)),
            Duration::from_millis(77)
        );
    }
}
