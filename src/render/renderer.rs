//! Diff renderer.
//!
//! Keeps the previously written frame and rewrites only from the first changed line down.
//! The cursor is assumed to rest at the end of the last written line between renders.

use tracing::debug;

use crate::core::output::TerminalCmd;
use crate::core::style::Size;
use crate::core::text::utils::truncate_to_width;
use crate::core::text::width::visible_width;

#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous_lines: Vec<String>,
    previous_size: Option<Size>,
    rows_rendered: usize,
    debug_redraw: bool,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every redraw decision at debug level.
    pub fn with_debug_redraw(mut self, enabled: bool) -> Self {
        self.debug_redraw = enabled;
        self
    }

    /// Forget the previous frame so the next render writes everything (no clear).
    pub fn reset(&mut self) {
        self.previous_lines.clear();
        self.rows_rendered = 0;
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    pub fn rows_rendered(&self) -> usize {
        self.rows_rendered
    }

    fn log(&self, reason: &str, new_len: usize) {
        if self.debug_redraw {
            debug!(
                reason,
                previous = self.previous_lines.len(),
                new = new_len,
                "redraw"
            );
        }
    }

    fn full_render(&mut self, lines: Vec<String>, size: Size, clear: bool) -> Vec<TerminalCmd> {
        let mut cmds = Vec::new();
        if clear {
            cmds.push(TerminalCmd::ClearScreen);
        }
        if !lines.is_empty() {
            cmds.push(TerminalCmd::Bytes(lines.join("\r\n")));
        }
        self.rows_rendered = lines.len();
        self.previous_lines = lines;
        self.previous_size = Some(size);
        cmds
    }

    /// Commands that turn the previous frame into `lines` on a terminal of `size`.
    ///
    /// Lines wider than the terminal are truncated so row accounting stays exact.
    pub fn render(&mut self, lines: Vec<String>, size: Size) -> Vec<TerminalCmd> {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|line| {
                if visible_width(&line) > size.width {
                    truncate_to_width(&line, size.width)
                } else {
                    line
                }
            })
            .collect();

        if self.previous_size.is_some_and(|previous| previous != size) {
            self.log("terminal size changed", lines.len());
            return self.full_render(lines, size, true);
        }
        if self.rows_rendered == 0 {
            self.log("first render", lines.len());
            return self.full_render(lines, size, false);
        }
        if lines == self.previous_lines {
            return Vec::new();
        }

        let common = lines.len().min(self.previous_lines.len());
        let first_diff = (0..common)
            .find(|&i| lines[i] != self.previous_lines[i])
            .unwrap_or(common);
        // Appended or removed lines: restart from the last line both frames can reach.
        let diff = first_diff
            .min(lines.len().saturating_sub(1))
            .min(self.rows_rendered - 1);
        self.log("diff", lines.len());

        let mut cmds = vec![
            TerminalCmd::MoveUp(self.rows_rendered - 1 - diff),
            TerminalCmd::CarriageReturn,
            TerminalCmd::ClearToEnd,
        ];
        if diff < lines.len() {
            cmds.push(TerminalCmd::Bytes(lines[diff..].join("\r\n")));
        }

        self.rows_rendered = lines.len();
        self.previous_lines = lines;
        self.previous_size = Some(size);
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::DiffRenderer;
    use crate::core::output::{encode_all, TerminalCmd};
    use crate::core::style::Size;

    const SIZE: Size = Size::new(20, 10);

    fn frame(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn render(renderer: &mut DiffRenderer, lines: &[&str], size: Size) -> String {
        encode_all(&renderer.render(frame(lines), size))
    }

    #[test]
    fn first_render_writes_everything() {
        let mut renderer = DiffRenderer::new();
        assert_eq!(render(&mut renderer, &["a", "b"], SIZE), "a\r\nb");
        assert_eq!(renderer.rows_rendered(), 2);
    }

    #[test]
    fn identical_render_produces_no_output() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["line", "two"], SIZE);
        assert!(renderer.render(frame(&["line", "two"]), SIZE).is_empty());
    }

    #[test]
    fn diff_rewrites_from_first_changed_line() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["1", "2", "3", "4", "5"], SIZE);
        let output = render(&mut renderer, &["1", "2", "X", "4", "5"], SIZE);
        assert_eq!(output, "\x1b[2A\r\x1b[JX\r\n4\r\n5");
    }

    #[test]
    fn last_line_change_needs_no_cursor_move() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["a", "b"], SIZE);
        assert_eq!(render(&mut renderer, &["a", "c"], SIZE), "\r\x1b[Jc");
    }

    #[test]
    fn size_change_clears_and_redraws() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["a"], SIZE);
        let output = render(&mut renderer, &["a"], Size::new(30, 10));
        assert_eq!(output, "\x1b[2J\x1b[Ha");
    }

    #[test]
    fn shrinking_frame_clears_the_tail() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["a", "b", "c"], SIZE);
        // The new frame is a prefix; its last line is rewritten and the rest cleared.
        assert_eq!(render(&mut renderer, &["a", "b"], SIZE), "\x1b[1A\r\x1b[Jb");
        assert_eq!(renderer.rows_rendered(), 2);
    }

    #[test]
    fn growing_frame_appends_below() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["a", "b"], SIZE);
        assert_eq!(render(&mut renderer, &["a", "b", "c"], SIZE), "\r\x1b[Jb\r\nc");
    }

    #[test]
    fn reset_forces_full_write_without_clear() {
        let mut renderer = DiffRenderer::new();
        render(&mut renderer, &["a"], SIZE);
        renderer.reset();
        assert_eq!(
            renderer.render(frame(&["a"]), SIZE),
            vec![TerminalCmd::Bytes("a".to_string())]
        );
    }

    #[test]
    fn wide_lines_are_truncated() {
        let mut renderer = DiffRenderer::new();
        let output = render(&mut renderer, &["abcdef"], Size::new(3, 5));
        assert_eq!(output, "abc");
    }
}
