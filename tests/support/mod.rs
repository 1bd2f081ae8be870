#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tealeaf::core::terminal::{InputHandler, SignalHandler};
use tealeaf::{
    Cmd, Component, Event, Model, Size, StartOptions, StdinDecoder, Sub, Terminal,
    TerminalSignal, Text,
};

/// Scripted terminal input, replayed on a worker thread once the program starts.
#[derive(Debug, Clone)]
pub enum Feed {
    Bytes(Vec<u8>),
    Resize(Size),
    Signal(TerminalSignal),
}

impl Feed {
    pub fn bytes(data: &str) -> Self {
        Feed::Bytes(data.as_bytes().to_vec())
    }
}

#[derive(Debug, Default)]
pub struct TerminalState {
    pub writes: Vec<String>,
    pub calls: Vec<&'static str>,
    /// `None` makes size queries fail.
    pub size: Option<Size>,
    pub raw_fails: bool,
}

#[derive(Clone)]
pub struct Probe(Arc<Mutex<TerminalState>>);

impl Probe {
    pub fn writes(&self) -> Vec<String> {
        self.0.lock().expect("terminal state").writes.clone()
    }

    pub fn output(&self) -> String {
        self.writes().concat()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().expect("terminal state").calls.clone()
    }
}

pub struct FakeTerminal {
    state: Arc<Mutex<TerminalState>>,
    script: Vec<Feed>,
    feeder: Option<JoinHandle<()>>,
}

impl FakeTerminal {
    pub fn new(size: Size) -> Self {
        Self {
            state: Arc::new(Mutex::new(TerminalState {
                size: Some(size),
                ..TerminalState::default()
            })),
            script: Vec::new(),
            feeder: None,
        }
    }

    pub fn without_size() -> Self {
        let terminal = Self::new(Size::new(1, 1));
        terminal.state.lock().expect("terminal state").size = None;
        terminal
    }

    pub fn failing_raw_mode(self) -> Self {
        self.state.lock().expect("terminal state").raw_fails = true;
        self
    }

    pub fn feed(mut self, feed: Feed) -> Self {
        self.script.push(feed);
        self
    }

    pub fn probe(&self) -> Probe {
        Probe(Arc::clone(&self.state))
    }

    fn record(&self, call: &'static str) {
        self.state.lock().expect("terminal state").calls.push(call);
    }
}

impl Terminal for FakeTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        self.record("raw");
        if self.state.lock().expect("terminal state").raw_fails {
            return Err(io::Error::other("not a tty"));
        }
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        self.record("restore");
        Ok(())
    }

    fn start(
        &mut self,
        options: StartOptions,
        mut on_input: InputHandler,
        mut on_signal: SignalHandler,
    ) -> io::Result<()> {
        self.record("start");
        let script = std::mem::take(&mut self.script);
        let state = Arc::clone(&self.state);
        self.feeder = Some(thread::spawn(move || {
            let mut decoder = StdinDecoder::new(options.escape_timeout);
            for feed in script {
                match feed {
                    Feed::Bytes(bytes) => {
                        for event in decoder.process(&bytes) {
                            on_input(event);
                        }
                    }
                    Feed::Resize(size) => {
                        state.lock().expect("terminal state").size = Some(size);
                        on_signal(TerminalSignal::Resize);
                    }
                    Feed::Signal(signal) => on_signal(signal),
                }
            }
            for event in decoder.flush() {
                on_input(event);
            }
        }));
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        if let Some(feeder) = self.feeder.take() {
            self.record("stop");
            let _ = feeder.join();
        }
        Ok(())
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        self.state
            .lock()
            .expect("terminal state")
            .writes
            .push(data.to_string());
        Ok(())
    }

    fn size(&self) -> io::Result<Size> {
        self.state
            .lock()
            .expect("terminal state")
            .size
            .ok_or_else(|| io::Error::other("no size"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Value(u32),
    Quit,
    Panic,
}

/// Model that logs every event it sees and shows the latest entry.
pub struct Recorder {
    pub log: Vec<String>,
    views: Arc<AtomicUsize>,
    init: fn() -> Cmd<Msg>,
    subscriptions: fn() -> Vec<Sub<Msg>>,
    quit_on: fn(&[String]) -> bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            views: Arc::new(AtomicUsize::new(0)),
            init: Cmd::none,
            subscriptions: Vec::new,
            quit_on: |_| false,
        }
    }

    pub fn with_init(mut self, init: fn() -> Cmd<Msg>) -> Self {
        self.init = init;
        self
    }

    pub fn with_subscriptions(mut self, subscriptions: fn() -> Vec<Sub<Msg>>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Quit once `quit_on` accepts the log (checked after every event).
    pub fn quit_on(mut self, quit_on: fn(&[String]) -> bool) -> Self {
        self.quit_on = quit_on;
        self
    }

    /// Shared view counter; one view per render.
    pub fn views(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.views)
    }
}

pub fn describe(event: &Event<Msg>) -> String {
    match event {
        Event::Key(key) => format!("key {key}"),
        Event::WindowSize(size) => format!("size {}x{}", size.width, size.height),
        Event::Focus => "focus".to_string(),
        Event::Blur => "blur".to_string(),
        Event::UnknownSequence(_) | Event::UnknownByte(_) => "unknown".to_string(),
        Event::App(Msg::Value(value)) => format!("value {value}"),
        Event::App(other) => format!("{other:?}"),
    }
}

impl Model for Recorder {
    type Message = Msg;

    fn init(&self) -> Cmd<Msg> {
        (self.init)()
    }

    fn update(mut self, event: Event<Msg>) -> (Self, Cmd<Msg>) {
        self.log.push(describe(&event));
        let quit = (self.quit_on)(&self.log) || matches!(event, Event::App(Msg::Quit));
        let cmd = if quit { Cmd::quit() } else { Cmd::none() };
        (self, cmd)
    }

    fn view(&self) -> Box<dyn Component> {
        self.views.fetch_add(1, Ordering::SeqCst);
        Box::new(Text::new(self.log.last().cloned().unwrap_or_default()))
    }

    fn subscriptions(&self) -> Vec<Sub<Msg>> {
        (self.subscriptions)()
    }
}
