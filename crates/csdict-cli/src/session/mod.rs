//! Protocol session state machine.
//!
//! [`Session`] owns the control connection, the selected database and the
//! debug echo switch. It validates each [`Invocation`] against the current
//! connection state, performs the wire exchange and renders the reply to the
//! supplied writer. Every path that leaves the connected state drops the owned
//! connection, so a reconnect always starts from a fresh stream.

mod error;

use std::io::Write;

use csdict_protocol::{
    DEFAULT_DATABASE, MatchStrategy, Reply, ReplyError, Request, StatusCode,
};
use tracing::{debug, info};

use crate::command::{Command, Invocation};
use crate::transport::{Connection, Connector, Timeouts};

pub(crate) use error::{OpenFailure, SessionError};

const NO_MATCHING_WORDS: &str = "*****No matching word(s) found*****";
const NO_DEFINITION: &str = "***No definition found***";
const NO_FALLBACK_MATCHES: &str = "****No matches found****";
const INVALID_DATABASE: &str = "Invalid database, use 'dict' for list of databases";
const NO_DATABASES: &str = "No databases present";

/// Whether a control connection is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionState {
    Disconnected,
    Connected,
}

/// What the REPL should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

pub(crate) struct Session<C: Connector> {
    connector: C,
    connection: Option<Connection<C::Stream>>,
    database: String,
    timeouts: Timeouts,
    debug: bool,
}

impl<C: Connector> Session<C> {
    pub(crate) fn new(connector: C, timeouts: Timeouts, debug: bool) -> Self {
        Self {
            connector,
            connection: None,
            database: DEFAULT_DATABASE.to_owned(),
            timeouts,
            debug,
        }
    }

    pub(crate) const fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub(crate) fn database(&self) -> &str {
        &self.database
    }

    /// Runs one command, writing user-facing output to `out`.
    ///
    /// The connection-state requirement is checked before argument count and
    /// values, and no bytes reach the wire unless every check passes.
    pub(crate) fn dispatch<W: Write>(
        &mut self,
        invocation: Invocation,
        out: &mut W,
    ) -> Result<Flow, SessionError> {
        if !invocation.verb.requirement().permits(self.state()) {
            debug!(verb = %invocation.verb, state = ?self.state(), "command not valid in state");
            return Err(SessionError::UnexpectedCommand);
        }
        let command = Command::try_from(invocation)?;
        match command {
            Command::Open { host, port } => self.open(&host, port, out)?,
            Command::Close => self.disconnect(out),
            Command::Quit => {
                self.disconnect(out);
                return Ok(Flow::Exit);
            }
            Command::Dict => self.show_databases(out)?,
            Command::Set { database } => {
                debug!(previous = %self.database(), database = %database, "selected database");
                self.database = database;
            }
            Command::Match { phrase } => {
                self.lookup_matches(MatchStrategy::Exact, phrase, NO_MATCHING_WORDS, out)?;
            }
            Command::PrefixMatch { phrase } => {
                self.lookup_matches(MatchStrategy::Prefix, phrase, NO_MATCHING_WORDS, out)?;
            }
            Command::Define { phrase } => self.define(phrase, out)?,
        }
        Ok(Flow::Continue)
    }

    /// Best-effort `QUIT` and teardown, used for end-of-input and fatal
    /// input errors as well as `close`/`quit`.
    pub(crate) fn shutdown<W: Write>(&mut self, out: &mut W) {
        self.disconnect(out);
    }

    fn open<W: Write>(&mut self, host: &str, port: u16, out: &mut W) -> Result<(), SessionError> {
        let failed = |source| SessionError::ConnectionFailed {
            host: host.to_owned(),
            port,
            source,
        };
        let stream = self
            .connector
            .connect(host, port, self.timeouts)
            .map_err(|error| failed(OpenFailure::Connect(error)))?;
        let mut connection = Connection::new(stream);
        let greeting = connection
            .read_status()
            .map_err(|error| failed(OpenFailure::Greeting(error)))?;
        self.echo_status(out, greeting.raw())?;
        if greeting.code() != StatusCode::GREETING {
            debug!(host = %host, port, status = %greeting, "server rejected connection");
            return Err(failed(OpenFailure::Rejected(greeting)));
        }
        info!(host = %host, port, "control connection open");
        self.connection = Some(connection);
        self.database = DEFAULT_DATABASE.to_owned();
        Ok(())
    }

    fn disconnect<W: Write>(&mut self, out: &mut W) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(error) = self.echo_request(out, &Request::Quit) {
                debug!(%error, "failed to echo QUIT");
            }
            if let Err(error) = connection.send(&Request::Quit) {
                debug!(%error, "best-effort QUIT failed");
            }
            info!("control connection closed");
        }
        self.database = DEFAULT_DATABASE.to_owned();
    }

    fn teardown(&mut self, error: &ReplyError) {
        debug!(%error, "control connection failed");
        self.connection = None;
        self.database = DEFAULT_DATABASE.to_owned();
    }

    fn show_databases<W: Write>(&mut self, out: &mut W) -> Result<(), SessionError> {
        let reply = self.exchange(&Request::ShowDatabases, out)?;
        if reply.code() == StatusCode::DATABASE_LIST {
            return self.render(&reply, out);
        }
        self.echo_status(out, reply.status().raw())?;
        Err(SessionError::unexpected_reply(NO_DATABASES, reply.status()))
    }

    fn lookup_matches<W: Write>(
        &mut self,
        strategy: MatchStrategy,
        phrase: String,
        empty_notice: &str,
        out: &mut W,
    ) -> Result<(), SessionError> {
        let request = Request::Match {
            database: self.database.clone(),
            strategy,
            phrase,
        };
        let reply = self.exchange(&request, out)?;
        self.present_matches(&reply, empty_notice, out)
    }

    fn define<W: Write>(&mut self, phrase: String, out: &mut W) -> Result<(), SessionError> {
        let request = Request::Define {
            database: self.database.clone(),
            phrase: phrase.clone(),
        };
        let reply = self.exchange(&request, out)?;
        match reply.code() {
            StatusCode::DEFINITIONS_FOLLOW => self.render(&reply, out),
            StatusCode::NO_MATCH => {
                self.echo_status(out, reply.status().raw())?;
                notice(out, NO_DEFINITION)?;
                debug!(phrase = %phrase, "no definition, falling back to server-default match");
                self.lookup_matches(MatchStrategy::ServerDefault, phrase, NO_FALLBACK_MATCHES, out)
            }
            _ => {
                self.echo_status(out, reply.status().raw())?;
                Err(SessionError::unexpected_reply(INVALID_DATABASE, reply.status()))
            }
        }
    }

    fn present_matches<W: Write>(
        &self,
        reply: &Reply,
        empty_notice: &str,
        out: &mut W,
    ) -> Result<(), SessionError> {
        match reply.code() {
            StatusCode::MATCHES_FOLLOW => self.render(reply, out),
            StatusCode::NO_MATCH => {
                self.echo_status(out, reply.status().raw())?;
                notice(out, empty_notice)
            }
            _ => {
                self.echo_status(out, reply.status().raw())?;
                Err(SessionError::unexpected_reply(INVALID_DATABASE, reply.status()))
            }
        }
    }

    /// Sends one request and reads its reply.
    ///
    /// Transport failures tear the connection down; a malformed but complete
    /// reply leaves it open.
    fn exchange<W: Write>(&mut self, request: &Request, out: &mut W) -> Result<Reply, SessionError> {
        self.echo_request(out, request)?;
        let connection = self
            .connection
            .as_mut()
            .ok_or(SessionError::UnexpectedCommand)?;
        let result = connection
            .send(request)
            .map_err(ReplyError::from)
            .and_then(|()| connection.read_reply());
        match result {
            Ok(reply) => {
                debug!(request = %request, code = %reply.code(), lines = reply.body().len(), "exchange complete");
                Ok(reply)
            }
            Err(error) if error.is_transport_failure() => {
                self.teardown(&error);
                Err(SessionError::ControlConnection { source: error })
            }
            Err(error) => {
                debug!(%error, "malformed reply");
                Err(SessionError::MalformedReply { source: error })
            }
        }
    }

    /// Writes a data block body, interleaving status echoes in wire order.
    fn render<W: Write>(&self, reply: &Reply, out: &mut W) -> Result<(), SessionError> {
        self.echo_status(out, reply.status().raw())?;
        for line in reply.body() {
            if let Some(raw) = line.status_echo() {
                self.echo_status(out, raw)?;
            }
            writeln!(out, "{line}").map_err(SessionError::Output)?;
        }
        if let Reply::DataBlock { terminal, .. } = reply {
            self.echo_status(out, terminal.raw())?;
        }
        Ok(())
    }

    fn echo_request<W: Write>(&self, out: &mut W, request: &Request) -> Result<(), SessionError> {
        if self.debug {
            writeln!(out, "> {request}").map_err(SessionError::Output)?;
        }
        Ok(())
    }

    fn echo_status<W: Write>(&self, out: &mut W, status: &str) -> Result<(), SessionError> {
        if self.debug {
            writeln!(out, "<-- {status}").map_err(SessionError::Output)?;
        }
        Ok(())
    }
}

fn notice<W: Write>(out: &mut W, text: &str) -> Result<(), SessionError> {
    writeln!(out, "{text}").map_err(SessionError::Output)
}
