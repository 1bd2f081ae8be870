//! Messages flowing through the program queue.

use crate::core::input::Key;
use crate::core::input_event::InputEvent;
use crate::core::style::Size;

/// What `Model::update` sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<M> {
    Key(Key),
    /// Terminal size, delivered once at startup and after every resize probe.
    WindowSize(Size),
    Focus,
    Blur,
    UnknownSequence(Vec<u8>),
    UnknownByte(u8),
    /// Application-defined message.
    App(M),
}

impl<M> Event<M> {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Event::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn app(&self) -> Option<&M> {
        match self {
            Event::App(msg) => Some(msg),
            _ => None,
        }
    }
}

impl<M> From<InputEvent> for Event<M> {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Key(key) => Event::Key(key),
            InputEvent::FocusIn => Event::Focus,
            InputEvent::FocusOut => Event::Blur,
            InputEvent::UnknownSequence(bytes) => Event::UnknownSequence(bytes),
            InputEvent::UnknownByte(byte) => Event::UnknownByte(byte),
        }
    }
}

/// Queue entry: an event for `update`, or a control message the event loop handles itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<M> {
    Event(Event<M>),
    /// Render the final state, tear down and return the model.
    Quit,
    /// Apply every message in order with a single render at the end.
    Batch(Vec<Message<M>>),
    /// Re-query the terminal size and deliver [`Event::WindowSize`].
    QueryWindowSize,
    EnableReportFocus,
    DisableReportFocus,
}

impl<M> Message<M> {
    pub fn app(msg: M) -> Self {
        Message::Event(Event::App(msg))
    }
}

impl<M> From<Event<M>> for Message<M> {
    fn from(event: Event<M>) -> Self {
        Message::Event(event)
    }
}

impl<M> From<InputEvent> for Message<M> {
    fn from(event: InputEvent) -> Self {
        Message::Event(event.into())
    }
}
