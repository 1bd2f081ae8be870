use proptest::prelude::*;
use tealeaf::{InputEvent, Key, KeyType, StdinDecoder};

const TOKENS: &[&str] = &[
    "a",
    "xyz",
    "日本",
    "é",
    " ",
    "\r",
    "\t",
    "\x7f",
    "\x03",
    "\x1b[A",
    "\x1bOB",
    "\x1b[1;5C",
    "\x1b[3~",
    "\x1b[15~",
    "\x1bOP",
    "\x1b[Z",
    "\x1b[I",
    "\x1b[O",
    "\x1bq",
    "\x1b[200~pasted\ttext\x1b[201~",
];

/// Merge adjacent plain rune events, since how typed text coalesces depends on chunking.
fn normalize(events: Vec<InputEvent>) -> Vec<InputEvent> {
    let mut merged: Vec<InputEvent> = Vec::new();
    for event in events {
        if let (Some(InputEvent::Key(last)), InputEvent::Key(key)) = (merged.last_mut(), &event) {
            let plain = |key: &Key| key.key_type == KeyType::Runes && !key.alt && !key.paste;
            if plain(last) && plain(key) {
                last.runes.extend(key.runes.iter().copied());
                continue;
            }
        }
        merged.push(event);
    }
    merged
}

fn decode(chunks: &[&[u8]]) -> Vec<InputEvent> {
    let mut decoder = StdinDecoder::default();
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(decoder.process(chunk));
    }
    events.extend(decoder.flush());
    normalize(events)
}

#[test]
fn escape_then_bracket_is_one_up() {
    assert_eq!(
        decode(&[b"\x1b", b"[A"]),
        vec![InputEvent::Key(Key::new(KeyType::Up))]
    );
    assert_eq!(decode(&[b"\x1b[A"]), decode(&[b"\x1b", b"[", b"A"]));
}

#[test]
fn key_names_match_for_common_keys() {
    let names: Vec<String> = decode(&[b"\x03\x1b[Z\x1bq\x1b[15~"])
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, ["ctrl+c", "shift+tab", "alt+q", "f5"]);
}

proptest! {
    #[test]
    fn chunking_never_changes_decoded_events(
        tokens in prop::collection::vec(prop::sample::select(TOKENS), 1..12),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let stream: Vec<u8> = tokens.concat().into_bytes();
        let expected = decode(&[&stream]);

        let mut offsets: Vec<usize> = cuts.iter().map(|cut| cut.index(stream.len() + 1)).collect();
        offsets.sort_unstable();
        offsets.dedup();
        let mut chunks: Vec<&[u8]> = Vec::new();
        let mut start = 0;
        for offset in offsets {
            chunks.push(&stream[start..offset]);
            start = offset;
        }
        chunks.push(&stream[start..]);

        prop_assert_eq!(decode(&chunks), expected);
    }
}
