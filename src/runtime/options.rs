//! Program options.

use std::time::Duration;

use crate::config::EnvConfig;
use crate::core::style::Size;
use crate::platform::stdin_buffer::DEFAULT_ESCAPE_TIMEOUT;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_MAX_IN_FLIGHT_COMMANDS: usize = 64;
pub const DEFAULT_SIZE: Size = Size::new(80, 24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOptions {
    pub hide_cursor: bool,
    pub raw_mode: bool,
    pub bracketed_paste: bool,
    pub report_focus: bool,
    /// Render the root at terminal height instead of its minimum height.
    pub full_screen: bool,
    pub queue_capacity: usize,
    pub max_in_flight_commands: usize,
    pub escape_timeout: Duration,
    /// Used when the terminal size cannot be queried.
    pub default_size: Size,
    /// Forward SIGINT/SIGTERM as Quit.
    pub handle_signals: bool,
    pub debug_redraw: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            hide_cursor: true,
            raw_mode: true,
            bracketed_paste: false,
            report_focus: false,
            full_screen: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_in_flight_commands: DEFAULT_MAX_IN_FLIGHT_COMMANDS,
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            default_size: DEFAULT_SIZE,
            handle_signals: true,
            debug_redraw: false,
        }
    }
}

impl ProgramOptions {
    /// Defaults adjusted by `TEALEAF_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env(&EnvConfig::from_env())
    }

    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if env.no_raw {
            self.raw_mode = false;
        }
        if env.debug_redraw {
            self.debug_redraw = true;
        }
        self
    }

    pub fn hide_cursor(mut self, enabled: bool) -> Self {
        self.hide_cursor = enabled;
        self
    }

    pub fn raw_mode(mut self, enabled: bool) -> Self {
        self.raw_mode = enabled;
        self
    }

    pub fn bracketed_paste(mut self, enabled: bool) -> Self {
        self.bracketed_paste = enabled;
        self
    }

    pub fn report_focus(mut self, enabled: bool) -> Self {
        self.report_focus = enabled;
        self
    }

    pub fn full_screen(mut self, enabled: bool) -> Self {
        self.full_screen = enabled;
        self
    }

    /// Clamped to at least 1.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Clamped to at least 1.
    pub fn max_in_flight_commands(mut self, limit: usize) -> Self {
        self.max_in_flight_commands = limit.max(1);
        self
    }

    pub fn escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    pub fn default_size(mut self, size: Size) -> Self {
        self.default_size = size;
        self
    }

    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    pub fn debug_redraw(mut self, enabled: bool) -> Self {
        self.debug_redraw = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ProgramOptions;
    use crate::config::EnvConfig;
    use crate::core::style::Size;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let options = ProgramOptions::default();
        assert!(options.hide_cursor);
        assert!(options.raw_mode);
        assert!(!options.bracketed_paste);
        assert!(!options.full_screen);
        assert_eq!(options.queue_capacity, 100);
        assert_eq!(options.max_in_flight_commands, 64);
        assert_eq!(options.escape_timeout, Duration::from_millis(25));
        assert_eq!(options.default_size, Size::new(80, 24));
    }

    #[test]
    fn env_can_disable_raw_mode_and_enable_redraw_logs() {
        let env = EnvConfig {
            no_raw: true,
            debug_redraw: true,
            log_file: None,
        };
        let options = ProgramOptions::default().with_env(&env);
        assert!(!options.raw_mode);
        assert!(options.debug_redraw);
    }

    #[test]
    fn capacities_never_reach_zero() {
        let options = ProgramOptions::default()
            .queue_capacity(0)
            .max_in_flight_commands(0);
        assert_eq!(options.queue_capacity, 1);
        assert_eq!(options.max_in_flight_commands, 1);
    }
}
