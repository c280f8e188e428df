//! Interactive command modelling.
//!
//! A typed line goes through three stages: [`Invocation::parse`] tokenizes it
//! and recognises the verb, [`Verb::requirement`] is checked against the
//! session's connection state, and [`Command::try_from`] validates argument
//! count and values. The stages run in that order so a command issued in the
//! wrong state is reported as unexpected before its arguments are inspected.

use std::str::FromStr;

use strum::{Display, EnumString};

use crate::session::{ConnectionState, SessionError};

/// Command words accepted at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub(crate) enum Verb {
    Open,
    Close,
    Quit,
    Dict,
    Set,
    Match,
    PrefixMatch,
    Define,
}

/// Connection state a verb may be issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    Any,
    Connected,
    Disconnected,
}

impl Requirement {
    pub(crate) const fn permits(self, state: ConnectionState) -> bool {
        match self {
            Self::Any => true,
            Self::Connected => matches!(state, ConnectionState::Connected),
            Self::Disconnected => matches!(state, ConnectionState::Disconnected),
        }
    }
}

/// Number of arguments a verb takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub(crate) const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(expected) => count == expected,
            Self::AtLeast(minimum) => count >= minimum,
        }
    }
}

impl Verb {
    pub(crate) const fn requirement(self) -> Requirement {
        match self {
            Self::Open => Requirement::Disconnected,
            Self::Quit => Requirement::Any,
            Self::Close
            | Self::Dict
            | Self::Set
            | Self::Match
            | Self::PrefixMatch
            | Self::Define => Requirement::Connected,
        }
    }

    pub(crate) const fn arity(self) -> Arity {
        match self {
            Self::Open => Arity::Exactly(2),
            Self::Close | Self::Quit | Self::Dict => Arity::Exactly(0),
            Self::Set => Arity::Exactly(1),
            Self::Match | Self::PrefixMatch | Self::Define => Arity::AtLeast(1),
        }
    }
}

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) verb: Verb,
    pub(crate) arguments: Vec<String>,
}

impl Invocation {
    /// Tokenizes a prompt line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>, SessionError> {
        let mut tokens = line
            .trim()
            .split([' ', '\t'])
            .filter(|token| !token.is_empty());
        let Some(word) = tokens.next() else {
            return Ok(None);
        };
        if word.starts_with('#') {
            return Ok(None);
        }
        let verb = Verb::from_str(word).map_err(|_| SessionError::UnknownCommand)?;
        Ok(Some(Self {
            verb,
            arguments: tokens.map(str::to_owned).collect(),
        }))
    }
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Open { host: String, port: u16 },
    Close,
    Quit,
    Dict,
    Set { database: String },
    Match { phrase: String },
    PrefixMatch { phrase: String },
    Define { phrase: String },
}

impl TryFrom<Invocation> for Command {
    type Error = SessionError;

    fn try_from(invocation: Invocation) -> Result<Self, Self::Error> {
        let Invocation { verb, arguments } = invocation;
        if !verb.arity().accepts(arguments.len()) {
            return Err(SessionError::ArgumentCount);
        }
        let mut arguments = arguments.into_iter();
        let command = match verb {
            Verb::Open => {
                let host = arguments.next().unwrap_or_default();
                let port = arguments
                    .next()
                    .unwrap_or_default()
                    .parse()
                    .map_err(|_| SessionError::InvalidArgument)?;
                Self::Open { host, port }
            }
            Verb::Close => Self::Close,
            Verb::Quit => Self::Quit,
            Verb::Dict => Self::Dict,
            Verb::Set => Self::Set {
                database: arguments.next().unwrap_or_default(),
            },
            Verb::Match => Self::Match {
                phrase: join_phrase(arguments),
            },
            Verb::PrefixMatch => Self::PrefixMatch {
                phrase: join_phrase(arguments),
            },
            Verb::Define => Self::Define {
                phrase: join_phrase(arguments),
            },
        };
        Ok(command)
    }
}

fn join_phrase(words: impl Iterator<Item = String>) -> String {
    words.collect::<Vec<_>>().join(" ")
}
