//! Process terminal: stdin/stdout of the current process, driven through termios.

#[cfg(unix)]
use std::io;
#[cfg(unix)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
#[cfg(unix)]
use std::thread::{self, JoinHandle};
#[cfg(unix)]
use std::time::{Duration, Instant};

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use signal_hook::iterator::Signals;
#[cfg(unix)]
use tracing::{debug, info, warn};

#[cfg(unix)]
use crate::core::style::Size;
#[cfg(unix)]
use crate::core::terminal::{InputHandler, SignalHandler, StartOptions, Terminal, TerminalSignal};
#[cfg(unix)]
use crate::platform::stdin_buffer::StdinDecoder;

/// Upper bound on one blocking poll so `stop()` is observed promptly.
#[cfg(unix)]
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        return Err(io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => written += count.min(bytes.len() - written),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<Size> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some(Size::new(size.ws_col as usize, size.ws_row as usize))
    } else {
        None
    }
}

/// Wait up to `timeout` for input. Hang-up and error conditions count as readable so the
/// following `read` reports them.
#[cfg(unix)]
fn poll_input(fd: c_int, timeout: Duration) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as c_int;
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    let ready = libc::POLLIN | libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;
    Ok(result > 0 && (fds.revents & ready) != 0)
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    stop_flag: Arc<AtomicBool>,
    input_thread: Option<JoinHandle<()>>,
    signal_handle: Option<signal_hook::iterator::Handle>,
    signal_thread: Option<JoinHandle<()>>,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO)
    }

    pub(crate) fn with_fds(stdin_fd: c_int, stdout_fd: c_int) -> Self {
        Self {
            stdin_fd,
            stdout_fd,
            original_termios: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            input_thread: None,
            signal_handle: None,
            signal_thread: None,
        }
    }

    fn start_input_thread(&mut self, escape_timeout: Duration, mut on_input: InputHandler) {
        let stdin_fd = self.stdin_fd;
        let stop_flag = Arc::clone(&self.stop_flag);

        self.input_thread = Some(thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            let mut decoder = StdinDecoder::new(escape_timeout);

            while !stop_flag.load(Ordering::SeqCst) {
                let now = Instant::now();
                let timeout = decoder.next_timeout(now, INPUT_POLL_INTERVAL);
                let readable = match poll_input(stdin_fd, timeout) {
                    Ok(readable) => readable,
                    Err(err) => {
                        warn!(error = %err, "stdin poll failed; input stopped");
                        break;
                    }
                };

                let events = if readable {
                    let read_len =
                        unsafe { libc::read(stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
                    if read_len == 0 {
                        info!("stdin closed; input stopped");
                        for event in decoder.flush() {
                            on_input(event);
                        }
                        break;
                    }
                    if read_len < 0 {
                        let err = io::Error::last_os_error();
                        if matches!(
                            err.kind(),
                            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                        ) {
                            continue;
                        }
                        warn!(error = %err, "stdin read failed; input stopped");
                        break;
                    }
                    decoder.process(&buffer[..read_len as usize])
                } else {
                    decoder.flush_due(Instant::now())
                };

                for event in events {
                    on_input(event);
                }
            }
            debug!("input thread exiting");
        }));
    }

    fn start_signal_thread(
        &mut self,
        interrupt_signals: bool,
        mut on_signal: SignalHandler,
    ) -> io::Result<()> {
        let mut wanted = vec![libc::SIGWINCH];
        if interrupt_signals {
            wanted.extend([libc::SIGINT, libc::SIGTERM]);
        }
        let mut signals = Signals::new(&wanted)?;
        let handle = signals.handle();

        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                let forwarded = if signal == libc::SIGWINCH {
                    TerminalSignal::Resize
                } else {
                    info!(signal, "interrupt received");
                    TerminalSignal::Interrupt
                };
                on_signal(forwarded);
            }
        });

        self.signal_handle = Some(handle);
        self.signal_thread = Some(thread);
        Ok(())
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.take() {
            set_termios(self.stdin_fd, &original)?;
        }
        Ok(())
    }

    fn start(
        &mut self,
        options: StartOptions,
        on_input: InputHandler,
        on_signal: SignalHandler,
    ) -> io::Result<()> {
        self.stop()?;
        self.stop_flag.store(false, Ordering::SeqCst);
        self.start_signal_thread(options.interrupt_signals, on_signal)?;
        self.start_input_thread(options.escape_timeout, on_input);
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.signal_thread.take() {
            let _ = thread.join();
        }
        Ok(())
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        write_fd(self.stdout_fd, data)
    }

    fn size(&self) -> io::Result<Size> {
        read_winsize(self.stdout_fd)
            .or_else(|| read_winsize(self.stdin_fd))
            .ok_or_else(|| io::Error::other("terminal size unavailable"))
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
