//! Crate error type.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Writing to the terminal failed while the program was running.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The program was stopped with `ProgramHandle::kill`.
    #[error("program was killed")]
    Killed,

    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
