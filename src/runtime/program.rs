//! The program event loop.
//!
//! One consumer owns the model: it pops messages from a bounded queue, calls `update`,
//! renders `view` and hands the frame to the diff renderer. Input, signals, commands and
//! subscriptions are producers that only push onto the queue.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::core::component::Component;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::style::Size;
use crate::core::terminal::{
    InputHandler, SignalHandler, StartOptions, Terminal, TerminalGuard, TerminalSignal,
};
use crate::error::{Error, Result};
use crate::render::renderer::DiffRenderer;
use crate::runtime::command::{BlockingFn, BoxFuture, Cmd, CmdKind};
use crate::runtime::message::{Event, Message};
use crate::runtime::options::ProgramOptions;
use crate::runtime::sender::Sender;
use crate::runtime::subscription::Sub;

/// How long shutdown waits for commands and subscriptions to observe cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(1000);

/// Application state driven by the program.
pub trait Model: Send + Sized + 'static {
    type Message: Send + 'static;

    /// Command to run once at startup.
    fn init(&self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    fn update(self, event: Event<Self::Message>) -> (Self, Cmd<Self::Message>);

    /// Build the component tree for the current state. Called after every processed message.
    fn view(&self) -> Box<dyn Component>;

    /// Sources started once when the program starts.
    fn subscriptions(&self) -> Vec<Sub<Self::Message>> {
        Vec::new()
    }
}

/// Lifecycle. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Idle,
    Running,
    ShuttingDown,
    Terminated,
}

/// External control surface for a program, usable from any task.
pub struct ProgramHandle<M> {
    sender: Sender<M>,
    state: watch::Receiver<ProgramState>,
}

impl<M> Clone for ProgramHandle<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }
}

impl<M: Send + 'static> ProgramHandle<M> {
    pub async fn send(&self, msg: impl Into<Message<M>>) -> bool {
        self.sender.send(msg).await
    }

    pub async fn send_app(&self, msg: M) -> bool {
        self.sender.send_app(msg).await
    }

    pub fn sender(&self) -> Sender<M> {
        self.sender.clone()
    }

    /// Queue a Quit: the program renders its final state and returns the model.
    pub async fn quit(&self) -> bool {
        self.sender.send(Message::Quit).await
    }

    /// Stop immediately without a final render. The terminal is still restored.
    pub fn kill(&self) {
        self.sender.token().cancel();
    }

    pub fn state(&self) -> ProgramState {
        *self.state.borrow()
    }

    /// Resolve once the program has terminated (or was dropped without running).
    pub async fn wait(&self) {
        let mut state = self.state.clone();
        let _ = state
            .wait_for(|state| *state == ProgramState::Terminated)
            .await;
    }
}

pub struct Program<M: Model, T: Terminal> {
    model: M,
    terminal: T,
    options: ProgramOptions,
    sender: Sender<M::Message>,
    rx: mpsc::Receiver<Message<M::Message>>,
    state: watch::Sender<ProgramState>,
}

impl<M: Model, T: Terminal + 'static> Program<M, T> {
    /// A program with default options adjusted by the environment.
    pub fn new(model: M, terminal: T) -> Self {
        Self::with_options(model, terminal, ProgramOptions::from_env())
    }

    pub fn with_options(model: M, terminal: T, options: ProgramOptions) -> Self {
        let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
        let (state, _) = watch::channel(ProgramState::Idle);
        Self {
            model,
            terminal,
            options,
            sender: Sender::new(tx, CancellationToken::new()),
            rx,
            state,
        }
    }

    pub fn handle(&self) -> ProgramHandle<M::Message> {
        ProgramHandle {
            sender: self.sender.clone(),
            state: self.state.subscribe(),
        }
    }

    /// Run until Quit (returns the final model) or Kill (returns [`Error::Killed`]).
    ///
    /// Terminal modes acquired at startup are released on every exit path. Polling this
    /// outside a tokio runtime fails with an i/o error.
    pub async fn run(self) -> Result<M> {
        let Program {
            model,
            terminal,
            options,
            sender,
            rx,
            state,
        } = self;

        let mut event_loop = EventLoop {
            guard: TerminalGuard::new(terminal),
            renderer: DiffRenderer::new().with_debug_redraw(options.debug_redraw),
            output: OutputGate::new(),
            size: options.default_size,
            token: sender.token().clone(),
            permits: Arc::new(Semaphore::new(options.max_in_flight_commands.max(1))),
            tracker: TaskTracker::new(),
            subscriptions: Vec::new(),
            options,
            sender,
            rx,
            state,
        };

        event_loop.set_state(ProgramState::Running);
        let outcome = event_loop.run(model).await;
        event_loop.shutdown(outcome).await
    }
}

enum Flow {
    Continue,
    Quit,
}

enum Exit {
    Quit,
    Killed,
}

enum Work<M> {
    Blocking(BlockingFn<M>),
    Async(BoxFuture<Option<Message<M>>>),
}

struct EventLoop<M: Model, T: Terminal> {
    guard: TerminalGuard<T>,
    renderer: DiffRenderer,
    output: OutputGate,
    size: Size,
    options: ProgramOptions,
    sender: Sender<M::Message>,
    rx: mpsc::Receiver<Message<M::Message>>,
    token: CancellationToken,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    subscriptions: Vec<AbortHandle>,
    state: watch::Sender<ProgramState>,
}

impl<M: Model, T: Terminal + 'static> EventLoop<M, T> {
    fn set_state(&self, state: ProgramState) {
        info!(?state, "program state");
        self.state.send_replace(state);
    }

    async fn run(&mut self, model: M) -> Result<(M, Exit)> {
        self.setup()?;

        let init = model.init();
        self.schedule(init);
        let size = self.size;
        let mut model = self.update(model, Event::WindowSize(size));
        for sub in model.subscriptions() {
            self.spawn_subscription(sub);
        }
        self.render(&model)?;

        loop {
            let msg = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Ok((model, Exit::Killed)),
                msg = self.rx.recv() => msg,
            };
            let Some(msg) = msg else {
                return Ok((model, Exit::Killed));
            };

            let (next, flow) = self.dispatch(model, msg)?;
            model = next;
            self.render(&model)?;
            if let Flow::Quit = flow {
                return Ok((model, Exit::Quit));
            }
        }
    }

    fn setup(&mut self) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current().map_err(io::Error::other)?;
        let input_sender = self.sender.clone();
        let input_runtime = handle.clone();
        let on_input: InputHandler = Box::new(move |event| {
            input_runtime.block_on(input_sender.send(event));
        });
        let signal_sender = self.sender.clone();
        let on_signal: SignalHandler = Box::new(move |signal| {
            let msg = match signal {
                TerminalSignal::Resize => Message::QueryWindowSize,
                TerminalSignal::Interrupt => Message::Quit,
            };
            handle.block_on(signal_sender.send(msg));
        });

        let options = &self.options;
        let Some(terminal) = self.guard.terminal_mut() else {
            return Ok(());
        };

        let mut raw_mode = false;
        if options.raw_mode {
            match terminal.enable_raw_mode() {
                Ok(()) => raw_mode = true,
                Err(err) => {
                    warn!(error = %err, "raw mode unavailable; input stays line-buffered");
                }
            }
        }

        self.size = query_size(terminal, options.default_size);

        if options.hide_cursor {
            self.output.push(TerminalCmd::HideCursor);
        }
        if options.bracketed_paste {
            self.output.push(TerminalCmd::BracketedPasteEnable);
        }
        if options.report_focus {
            self.output.push(TerminalCmd::FocusReportEnable);
        }
        let flushed = self.output.flush(terminal);

        let start = StartOptions {
            escape_timeout: options.escape_timeout,
            interrupt_signals: options.handle_signals,
        };
        if let Err(err) = terminal.start(start, on_input, on_signal) {
            warn!(error = %err, "terminal input unavailable");
        }

        let modes = self.guard.modes_mut();
        modes.raw_mode = raw_mode;
        if flushed.is_ok() {
            modes.cursor_hidden = self.options.hide_cursor;
            modes.bracketed_paste = self.options.bracketed_paste;
            modes.focus_reports = self.options.report_focus;
        }
        flushed?;
        Ok(())
    }

    fn dispatch(&mut self, model: M, msg: Message<M::Message>) -> Result<(M, Flow)> {
        match msg {
            Message::Event(event) => Ok((self.update(model, event), Flow::Continue)),
            Message::Quit => Ok((model, Flow::Quit)),
            Message::Batch(msgs) => {
                let mut model = model;
                let total = msgs.len();
                for (index, msg) in msgs.into_iter().enumerate() {
                    let (next, flow) = self.dispatch(model, msg)?;
                    model = next;
                    if let Flow::Quit = flow {
                        debug!(dropped = total - index - 1, "quit inside batch");
                        return Ok((model, Flow::Quit));
                    }
                }
                Ok((model, Flow::Continue))
            }
            Message::QueryWindowSize => {
                if let Some(terminal) = self.guard.terminal_mut() {
                    self.size = query_size(terminal, self.options.default_size);
                }
                let size = self.size;
                Ok((self.update(model, Event::WindowSize(size)), Flow::Continue))
            }
            Message::EnableReportFocus => {
                self.set_focus_reports(true)?;
                Ok((model, Flow::Continue))
            }
            Message::DisableReportFocus => {
                self.set_focus_reports(false)?;
                Ok((model, Flow::Continue))
            }
        }
    }

    fn update(&mut self, model: M, event: Event<M::Message>) -> M {
        let (model, cmd) = model.update(event);
        self.schedule(cmd);
        model
    }

    fn set_focus_reports(&mut self, enabled: bool) -> Result<()> {
        if self.guard.modes().focus_reports == enabled {
            return Ok(());
        }
        let Some(terminal) = self.guard.terminal_mut() else {
            return Ok(());
        };
        self.output.push(if enabled {
            TerminalCmd::FocusReportEnable
        } else {
            TerminalCmd::FocusReportDisable
        });
        self.output.flush(terminal)?;
        self.guard.modes_mut().focus_reports = enabled;
        Ok(())
    }

    /// Lay out the view at terminal width and write whatever changed.
    fn render(&mut self, model: &M) -> Result<()> {
        let root = model.view();
        let height = if self.options.full_screen {
            self.size.height
        } else {
            root.min_size().height.min(self.size.height)
        };
        let lines = root.render(Size::new(self.size.width, height));

        let cmds = self.renderer.render(lines, self.size);
        if cmds.is_empty() {
            return Ok(());
        }
        let Some(terminal) = self.guard.terminal_mut() else {
            return Ok(());
        };
        self.output.extend(cmds);
        self.output.flush(terminal)?;
        self.guard.modes_mut().frame_drawn = true;
        Ok(())
    }

    fn schedule(&self, cmd: Cmd<M::Message>) {
        match cmd.kind {
            CmdKind::None => {}
            CmdKind::Batch(cmds) => {
                for cmd in cmds {
                    self.schedule(cmd);
                }
            }
            CmdKind::Task(task) => self.spawn_command(Work::Blocking(task)),
            CmdKind::Future(future) => self.spawn_command(Work::Async(future)),
        }
    }

    /// Run one command under a supervisor that bounds concurrency, honours cancellation
    /// and keeps a panicking command from taking the program down.
    fn spawn_command(&self, work: Work<M::Message>) {
        let permits = Arc::clone(&self.permits);
        let token = self.token.clone();
        let sender = self.sender.clone();

        self.tracker.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let mut job: JoinHandle<Option<Message<M::Message>>> = match work {
                Work::Blocking(task) => tokio::task::spawn_blocking(task),
                Work::Async(future) => tokio::spawn(future),
            };
            let joined = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    job.abort();
                    debug!("command cancelled");
                    return;
                }
                joined = &mut job => joined,
            };
            drop(permit);

            match joined {
                Ok(Some(msg)) => {
                    sender.send(msg).await;
                }
                Ok(None) => {}
                Err(err) if err.is_panic() => warn!("command panicked; no message produced"),
                Err(err) => debug!(error = %err, "command did not complete"),
            }
        });
    }

    fn spawn_subscription(&mut self, sub: Sub<M::Message>) {
        let name = sub.name();
        let job = tokio::spawn(sub.start(self.token.clone(), self.sender.clone()));
        self.subscriptions.push(job.abort_handle());
        self.tracker.spawn(async move {
            match job.await {
                Ok(()) => debug!(subscription = name, "subscription exited"),
                Err(err) if err.is_panic() => warn!(subscription = name, "subscription panicked"),
                Err(_) => debug!(subscription = name, "subscription aborted"),
            }
        });
    }

    async fn shutdown(mut self, outcome: Result<(M, Exit)>) -> Result<M> {
        self.set_state(ProgramState::ShuttingDown);
        // Cancel first: producers blocked on a full queue must give up before the
        // terminal joins its worker threads.
        self.token.cancel();
        self.tracker.close();
        let released = self.guard.release();

        if tokio::time::timeout(SHUTDOWN_GRACE, self.tracker.wait())
            .await
            .is_err()
        {
            warn!("background tasks ignored cancellation; aborting subscriptions");
            for handle in &self.subscriptions {
                handle.abort();
            }
        }
        self.set_state(ProgramState::Terminated);

        let (model, exit) = outcome?;
        released?;
        match exit {
            Exit::Quit => Ok(model),
            Exit::Killed => Err(Error::Killed),
        }
    }
}

/// Terminal size, or `fallback` when it cannot be determined.
fn query_size<T: Terminal + ?Sized>(terminal: &T, fallback: Size) -> Size {
    match terminal.size() {
        Ok(size) if size.width > 0 && size.height > 0 => size,
        Ok(size) => {
            warn!(?size, ?fallback, "terminal reported an empty size; using default");
            fallback
        }
        Err(err) => {
            warn!(error = %err, ?fallback, "terminal size unavailable; using default");
            fallback
        }
    }
}
