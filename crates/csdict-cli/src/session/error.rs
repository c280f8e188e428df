//! Errors surfaced at the command dispatch boundary.
//!
//! Each variant renders as a single line prefixed by its fixed numeric
//! marker. The underlying cause, where there is one, stays available through
//! `source()` for diagnostic logging and never appears in the marker line.

use std::io;

use csdict_protocol::{ReplyError, StatusLine};
use thiserror::Error;

/// Errors raised while dispatching one interactive command.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("900 Invalid command.")]
    UnknownCommand,
    #[error("901 Incorrect number of arguments.")]
    ArgumentCount,
    #[error("902 Invalid argument.")]
    InvalidArgument,
    #[error("903 Supplied command not expected at this time.")]
    UnexpectedCommand,
    #[error("920 Control connection to {host} on port {port} failed to open.")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: OpenFailure,
    },
    #[error("925 Control connection I/O error, closing control connection.")]
    ControlConnection {
        #[source]
        source: ReplyError,
    },
    #[error("999 Processing error. {detail}.")]
    UnexpectedReply { detail: &'static str, status: String },
    #[error("999 Processing error. Malformed reply.")]
    MalformedReply {
        #[source]
        source: ReplyError,
    },
    #[error("999 Processing error. Failed to write output.")]
    Output(#[source] io::Error),
}

impl SessionError {
    pub(crate) fn unexpected_reply(detail: &'static str, status: &StatusLine) -> Self {
        Self::UnexpectedReply {
            detail,
            status: status.raw().to_owned(),
        }
    }
}

/// Reasons an `open` command failed.
#[derive(Debug, Error)]
pub(crate) enum OpenFailure {
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to read greeting: {0}")]
    Greeting(#[source] ReplyError),
    #[error("server refused the session: {0}")]
    Rejected(StatusLine),
}
