//! Reactive runtime: model, messages, commands, subscriptions and the event loop.

pub mod command;
pub mod message;
pub mod options;
pub mod program;
pub mod sender;
pub mod subscription;

pub use command::Cmd;
pub use message::{Event, Message};
pub use options::ProgramOptions;
pub use program::{Model, Program, ProgramHandle, ProgramState};
pub use sender::Sender;
pub use subscription::Sub;
