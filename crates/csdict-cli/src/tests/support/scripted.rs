//! In-memory connector that replays canned server transcripts.
//!
//! Each `connect` call consumes the next transcript. Bytes written by the
//! session are captured in a buffer shared by every stream and every clone of
//! the connector, so tests keep a handle while the session owns another.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

use crate::transport::{Connector, Timeouts};

struct Transcript {
    server_output: Vec<u8>,
    failure: Option<io::ErrorKind>,
}

#[derive(Clone, Default)]
pub(in crate::tests) struct ScriptedConnector {
    transcripts: Rc<RefCell<VecDeque<Transcript>>>,
    wire: Rc<RefCell<Vec<u8>>>,
    attempts: Rc<Cell<usize>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection whose server sends `lines` and then closes.
    pub fn serving(self, lines: &[&str]) -> Self {
        self.push(lines, None)
    }

    /// Queues a connection whose server sends `lines` and then stops
    /// responding, so the next read fails with `kind`.
    pub fn failing_after(self, lines: &[&str], kind: io::ErrorKind) -> Self {
        self.push(lines, Some(kind))
    }

    fn push(self, lines: &[&str], failure: Option<io::ErrorKind>) -> Self {
        let mut server_output = Vec::new();
        for line in lines {
            server_output.extend_from_slice(line.as_bytes());
            server_output.extend_from_slice(b"\r\n");
        }
        self.transcripts.borrow_mut().push_back(Transcript {
            server_output,
            failure,
        });
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// Request lines written by the session, without terminators.
    pub fn sent(&self) -> Vec<String> {
        let wire = self.wire.borrow();
        String::from_utf8_lossy(&wire)
            .split_terminator("\r\n")
            .map(str::to_owned)
            .collect()
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    fn connect(&self, _host: &str, _port: u16, _timeouts: Timeouts) -> io::Result<ScriptedStream> {
        self.attempts.set(self.attempts.get() + 1);
        let transcript = self
            .transcripts
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))?;
        Ok(ScriptedStream {
            input: Cursor::new(transcript.server_output),
            failure: transcript.failure,
            wire: Rc::clone(&self.wire),
        })
    }
}

pub(in crate::tests) struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    failure: Option<io::ErrorKind>,
    wire: Rc<RefCell<Vec<u8>>>,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.input.read(buf)?;
        match (read, self.failure) {
            (0, Some(kind)) if !buf.is_empty() => Err(io::Error::from(kind)),
            _ => Ok(read),
        }
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.wire.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
