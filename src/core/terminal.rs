//! Terminal trait and scoped terminal-state release.

use std::io;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::input_event::InputEvent;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::style::Size;

/// Out-of-band notifications the terminal forwards to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSignal {
    /// The window size changed (SIGWINCH).
    Resize,
    /// SIGINT or SIGTERM.
    Interrupt,
}

pub type InputHandler = Box<dyn FnMut(InputEvent) + Send>;
pub type SignalHandler = Box<dyn FnMut(TerminalSignal) + Send>;

/// Settings for the input and signal workers started by [`Terminal::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOptions {
    /// How long a lone ESC (or any partial sequence) waits for more bytes.
    pub escape_timeout: Duration,
    /// Forward SIGINT/SIGTERM as [`TerminalSignal::Interrupt`].
    pub interrupt_signals: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            escape_timeout: crate::platform::stdin_buffer::DEFAULT_ESCAPE_TIMEOUT,
            interrupt_signals: true,
        }
    }
}

/// Minimal terminal interface for the runtime.
pub trait Terminal: Send {
    /// Switch input to raw mode. An error means input stays line-buffered.
    fn enable_raw_mode(&mut self) -> io::Result<()>;

    /// Undo [`Terminal::enable_raw_mode`]. A no-op when raw mode was never entered.
    fn restore_mode(&mut self) -> io::Result<()>;

    /// Start delivering decoded input and signals to the handlers.
    ///
    /// Handlers run on worker threads owned by the terminal. An input read failure or EOF
    /// ends input delivery only.
    fn start(
        &mut self,
        options: StartOptions,
        on_input: InputHandler,
        on_signal: SignalHandler,
    ) -> io::Result<()>;

    /// Stop the workers started by [`Terminal::start`]; idempotent.
    fn stop(&mut self) -> io::Result<()>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str) -> io::Result<()>;

    /// Current `(columns, rows)`.
    fn size(&self) -> io::Result<Size>;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        (**self).enable_raw_mode()
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        (**self).restore_mode()
    }

    fn start(
        &mut self,
        options: StartOptions,
        on_input: InputHandler,
        on_signal: SignalHandler,
    ) -> io::Result<()> {
        (**self).start(options, on_input, on_signal)
    }

    fn stop(&mut self) -> io::Result<()> {
        (**self).stop()
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        (**self).write(data)
    }

    fn size(&self) -> io::Result<Size> {
        (**self).size()
    }
}

/// Modes acquired at startup that must be undone exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquiredModes {
    pub raw_mode: bool,
    pub cursor_hidden: bool,
    pub bracketed_paste: bool,
    pub focus_reports: bool,
    /// Something was drawn, so the cursor sits at the end of the last frame line.
    pub frame_drawn: bool,
}

/// RAII guard that stops the terminal and restores every acquired mode on drop.
pub struct TerminalGuard<T: Terminal> {
    terminal: Option<T>,
    modes: AcquiredModes,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal: Some(terminal),
            modes: AcquiredModes::default(),
        }
    }

    pub fn modes(&self) -> AcquiredModes {
        self.modes
    }

    pub fn modes_mut(&mut self) -> &mut AcquiredModes {
        &mut self.modes
    }

    /// Access the wrapped terminal. `None` only after [`TerminalGuard::release`].
    pub fn terminal_mut(&mut self) -> Option<&mut T> {
        self.terminal.as_mut()
    }

    /// Tear down now and report the first failure. Later calls and the drop are no-ops.
    pub fn release(&mut self) -> io::Result<Option<T>> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(None);
        };
        let modes = std::mem::take(&mut self.modes);
        restore(&mut terminal, modes)?;
        Ok(Some(terminal))
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.as_mut() {
            let modes = std::mem::take(&mut self.modes);
            if let Err(err) = restore(terminal, modes) {
                warn!(error = %err, "terminal restore failed during drop");
            }
        }
    }
}

fn restore<T: Terminal + ?Sized>(terminal: &mut T, modes: AcquiredModes) -> io::Result<()> {
    debug!(?modes, "restoring terminal");
    let stop_result = terminal.stop();

    let mut gate = OutputGate::new();
    if modes.focus_reports {
        gate.push(TerminalCmd::FocusReportDisable);
    }
    if modes.bracketed_paste {
        gate.push(TerminalCmd::BracketedPasteDisable);
    }
    if modes.cursor_hidden {
        gate.push(TerminalCmd::ShowCursor);
    }
    if modes.frame_drawn {
        // Leave the shell prompt below the last frame.
        gate.push(TerminalCmd::NewLine);
    }
    let write_result = gate.flush(terminal);

    let mode_result = if modes.raw_mode {
        terminal.restore_mode()
    } else {
        Ok(())
    };

    stop_result.and(write_result).and(mode_result)
}
