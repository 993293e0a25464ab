//! Crate-wide error type.
//!
//! One enum covers every failure mode named in the protocol design:
//! transport failures, malformed server framing, protocol-level
//! violations, failed commands, aborts on close, and invalid local
//! arguments that never make it onto the wire.

use thiserror::Error;

use crate::response::Code;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport/IO failure (open, read, write, unexpected close). Fatal to the session.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// A response line could not be parsed. The line is dropped and the session continues.
    #[error("parser error at offset {offset}: expected {expected}, found {found}")]
    Parser {
        offset: usize,
        expected: String,
        found: String,
    },

    /// The server violated a protocol expectation (tag mismatch, unexpected continuation,
    /// command issued in the wrong state). Fatal: the connection is closed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A command's tagged response was NO or BAD.
    #[error("command failed ({kind:?}): {message}")]
    Command {
        kind: CommandErrorKind,
        code: Option<Code>,
        message: String,
    },

    /// The command was still queued or in flight when the connection closed.
    #[error("aborted: connection closed")]
    Aborted,

    /// Invalid local arguments; the command never entered the queue.
    #[error("invalid argument: {0}")]
    Local(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    ServerNo,
    ServerBad,
}

impl Error {
    pub fn command(kind: CommandErrorKind, code: Option<Code>, message: impl Into<String>) -> Self {
        Error::Command {
            kind,
            code,
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    pub fn local(message: impl Into<String>) -> Self {
        Error::Local(message.into())
    }
}
