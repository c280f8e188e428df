//! Assembly of server lines into replies.
//!
//! [`ReplyReader`] knows nothing about the request that produced a reply. The
//! shape is inferred from the leading status code alone:
//!
//! - `110`, `150` and `152` open a body that runs until a line starting with
//!   `250`;
//! - `552` is an empty result with no body;
//! - every other code is returned as a bare status for the caller to judge.
//!
//! Terminator detection is a literal prefix test. A body line that begins
//! with `250` ends the block; the protocol guarantees text lines never start
//! with a bare code, and the reader relies on that rather than guessing.

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::trace;

use crate::header::{DefinitionHeader, HeaderError};
use crate::status::{StatusCode, StatusError, StatusLine};

/// The parsed result of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A single status line without a body.
    StatusOnly {
        /// The status line.
        status: StatusLine,
    },
    /// An announced body closed by a `250` terminator.
    DataBlock {
        /// The status line that opened the block.
        status: StatusLine,
        /// Body lines in wire order.
        lines: Vec<BodyLine>,
        /// The `250` line that closed the block.
        terminal: StatusLine,
    },
    /// A `552` empty result.
    ErrorStatus {
        /// The status line.
        status: StatusLine,
    },
}

impl Reply {
    /// Leading status line of the reply.
    #[must_use]
    pub const fn status(&self) -> &StatusLine {
        match self {
            Self::StatusOnly { status }
            | Self::DataBlock { status, .. }
            | Self::ErrorStatus { status } => status,
        }
    }

    /// Leading status code of the reply.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.status().code()
    }

    /// Body lines; empty for replies without a body.
    #[must_use]
    pub fn body(&self) -> &[BodyLine] {
        match self {
            Self::DataBlock { lines, .. } => lines,
            Self::StatusOnly { .. } | Self::ErrorStatus { .. } => &[],
        }
    }

    /// User-facing rendering of the body, one string per line.
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<String> {
        self.body().iter().map(ToString::to_string).collect()
    }
}

/// One line inside a data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    /// Opaque text forwarded verbatim.
    Text(String),
    /// A `151` header inside a definition block.
    Header(DefinitionHeader),
}

impl BodyLine {
    /// Raw status text for header lines, used when echoing the wire.
    #[must_use]
    pub fn status_echo(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Header(header) => Some(header.raw()),
        }
    }
}

impl std::fmt::Display for BodyLine {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => formatter.write_str(text),
            Self::Header(header) => header.fmt(formatter),
        }
    }
}

/// Errors raised while reading a reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Reading from the underlying stream failed or timed out.
    #[error("failed to read from the control connection: {0}")]
    Io(#[from] io::Error),
    /// The stream ended before a complete reply arrived.
    #[error("control connection closed before the reply completed")]
    UnexpectedEof,
    /// The first line of a reply was not a status line.
    #[error(transparent)]
    MalformedStatus(#[from] StatusError),
    /// A `151` header could not be parsed. The rest of the block was consumed.
    #[error("malformed definition header {line:?}: {source}")]
    MalformedHeader {
        /// The offending line, without its terminator.
        line: String,
        /// Why the header was rejected.
        #[source]
        source: HeaderError,
    },
}

impl ReplyError {
    /// Returns true when the connection can no longer be trusted.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::UnexpectedEof)
    }
}

/// Reads status lines and reply blocks from a buffered stream.
#[derive(Debug)]
pub struct ReplyReader<R> {
    inner: R,
}

impl<R: BufRead> ReplyReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Mutable access to the wrapped reader.
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Reads a line without its `\r\n` or `\n` terminator.
    ///
    /// Returns `Ok(None)` at end of stream. Invalid UTF-8 is replaced lossily.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the wrapped reader, including timeouts.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buffer = Vec::new();
        if self.inner.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }
        while matches!(buffer.last(), Some(b'\n' | b'\r')) {
            buffer.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    /// Reads a single status line.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::UnexpectedEof`] at end of stream and
    /// [`ReplyError::MalformedStatus`] when the line has no leading code.
    pub fn read_status(&mut self) -> Result<StatusLine, ReplyError> {
        let line = self.read_line()?.ok_or(ReplyError::UnexpectedEof)?;
        trace!(line = %line, "received status line");
        Ok(StatusLine::parse(&line)?)
    }

    /// Reads exactly one reply.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError`] when the stream fails or ends early, when the
    /// leading line is not a status line, or when a definition header inside
    /// a `150` block is malformed.
    pub fn read_reply(&mut self) -> Result<Reply, ReplyError> {
        let status = self.read_status()?;
        let code = status.code();
        if code.opens_block() {
            self.read_block(status)
        } else if code == StatusCode::NO_MATCH {
            Ok(Reply::ErrorStatus { status })
        } else {
            Ok(Reply::StatusOnly { status })
        }
    }

    fn read_block(&mut self, status: StatusLine) -> Result<Reply, ReplyError> {
        let parses_headers = status.code() == StatusCode::DEFINITIONS_FOLLOW;
        let mut lines = Vec::new();
        let mut malformed: Option<ReplyError> = None;
        loop {
            let line = self.read_line()?.ok_or(ReplyError::UnexpectedEof)?;
            if StatusCode::OK.prefixes(&line) {
                let terminal = StatusLine::parse(&line)?;
                trace!(code = %status.code(), lines = lines.len(), "reply block complete");
                return match malformed {
                    Some(error) => Err(error),
                    None => Ok(Reply::DataBlock {
                        status,
                        lines,
                        terminal,
                    }),
                };
            }
            if parses_headers && StatusCode::DEFINITION_HEADER.prefixes(&line) {
                match DefinitionHeader::parse(&line) {
                    Ok(header) => lines.push(BodyLine::Header(header)),
                    Err(source) => {
                        if malformed.is_none() {
                            malformed = Some(ReplyError::MalformedHeader { line, source });
                        }
                    }
                }
                continue;
            }
            lines.push(BodyLine::Text(line));
        }
    }
}
