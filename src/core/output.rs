//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes flow through `OutputGate::flush(..)`.

use std::io;

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw text or control sequences.
    Bytes(String),

    HideCursor,
    ShowCursor,

    /// Move the cursor up `n` rows (no-op for zero).
    MoveUp(usize),
    /// Return to column 1.
    CarriageReturn,
    /// Move to the start of the next line.
    NewLine,
    /// Clear from the cursor to the end of the screen.
    ClearToEnd,
    /// Clear the whole screen and home the cursor.
    ClearScreen,

    FocusReportEnable,
    FocusReportDisable,
    BracketedPasteEnable,
    BracketedPasteDisable,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    /// Append the wire form of this command to `out`.
    pub fn encode(&self, out: &mut String) {
        match self {
            TerminalCmd::Bytes(data) => out.push_str(data),
            TerminalCmd::HideCursor => out.push_str("\x1b[?25l"),
            TerminalCmd::ShowCursor => out.push_str("\x1b[?25h"),
            TerminalCmd::MoveUp(0) => {}
            TerminalCmd::MoveUp(rows) => out.push_str(&format!("\x1b[{rows}A")),
            TerminalCmd::CarriageReturn => out.push('\r'),
            TerminalCmd::NewLine => out.push_str("\r\n"),
            TerminalCmd::ClearToEnd => out.push_str("\x1b[J"),
            TerminalCmd::ClearScreen => out.push_str("\x1b[2J\x1b[H"),
            TerminalCmd::FocusReportEnable => out.push_str("\x1b[?1004h"),
            TerminalCmd::FocusReportDisable => out.push_str("\x1b[?1004l"),
            TerminalCmd::BracketedPasteEnable => out.push_str("\x1b[?2004h"),
            TerminalCmd::BracketedPasteDisable => out.push_str("\x1b[?2004l"),
        }
    }
}

/// Encode a command list into one string.
pub fn encode_all(cmds: &[TerminalCmd]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        cmd.encode(&mut out);
    }
    out
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Flush buffered commands to the terminal as a single write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else. Nothing is written when the encoded output is empty.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) -> io::Result<()> {
        let out = encode_all(&self.cmds);
        self.cmds.clear();
        if out.is_empty() {
            return Ok(());
        }
        term.write(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_all, TerminalCmd};

    #[test]
    fn move_up_zero_is_silent() {
        assert_eq!(encode_all(&[TerminalCmd::MoveUp(0)]), "");
        assert_eq!(encode_all(&[TerminalCmd::MoveUp(3)]), "\x1b[3A");
    }

    #[test]
    fn commands_concatenate_in_order() {
        let cmds = [
            TerminalCmd::MoveUp(2),
            TerminalCmd::CarriageReturn,
            TerminalCmd::ClearToEnd,
            TerminalCmd::bytes("hi"),
        ];
        assert_eq!(encode_all(&cmds), "\x1b[2A\r\x1b[Jhi");
    }
}
