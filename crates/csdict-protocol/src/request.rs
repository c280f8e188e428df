//! Request lines sent to the server.

use std::fmt;
use std::io::{self, Write};

use strum::Display;

/// Database selector meaning "search every database".
pub const DEFAULT_DATABASE: &str = "*";

/// Matching strategy for `MATCH` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MatchStrategy {
    /// Whole-word match.
    #[strum(serialize = "exact")]
    Exact,
    /// Prefix match.
    #[strum(serialize = "prefix")]
    Prefix,
    /// Whatever the server considers its default strategy.
    #[strum(serialize = ".")]
    ServerDefault,
}

/// A single protocol request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `SHOW DB`
    ShowDatabases,
    /// `MATCH <database> <strategy> "<phrase>"`
    Match {
        /// Database selector.
        database: String,
        /// Strategy keyword.
        strategy: MatchStrategy,
        /// Phrase to match, sent inside double quotes.
        phrase: String,
    },
    /// `DEFINE <database> "<phrase>"`
    Define {
        /// Database selector.
        database: String,
        /// Phrase to define, sent inside double quotes.
        phrase: String,
    },
    /// `QUIT`
    Quit,
}

impl Request {
    /// Writes the request followed by CRLF and flushes the writer.
    ///
    /// # Errors
    ///
    /// Propagates write and flush failures.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}\r\n")?;
        writer.flush()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowDatabases => formatter.write_str("SHOW DB"),
            Self::Match {
                database,
                strategy,
                phrase,
            } => write!(formatter, "MATCH {database} {strategy} \"{phrase}\""),
            Self::Define { database, phrase } => {
                write!(formatter, "DEFINE {database} \"{phrase}\"")
            }
            Self::Quit => formatter.write_str("QUIT"),
        }
    }
}
