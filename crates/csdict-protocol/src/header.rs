//! Parser for `151` definition headers.
//!
//! A `150` reply carries one `151 <word> <database> "<description>"` line
//! before each definition text. The fields are positional: the word and
//! database may be bare tokens or quoted segments, and the description must
//! be quoted. Only the description is shown to the user, as `@ "<text>"`.

use std::fmt;

use thiserror::Error;

use crate::status::StatusCode;

/// A parsed `151` per-definition header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionHeader {
    word: String,
    database: String,
    description: String,
    raw: String,
}

impl DefinitionHeader {
    /// Parses a raw `151` line.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] when the line is not a `151` line, when a quoted
    /// segment is left open, when fewer than three fields follow the code, or
    /// when the third field is not quoted.
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        if !StatusCode::DEFINITION_HEADER.prefixes(line) {
            return Err(HeaderError::NotAHeader);
        }
        let fields = split_fields(line.get(3..).unwrap_or_default())?;
        match fields.as_slice() {
            [word, database, Field::Quoted(description), ..] => Ok(Self {
                word: word.value().to_owned(),
                database: database.value().to_owned(),
                description: description.clone(),
                raw: line.to_owned(),
            }),
            [_, _, Field::Bare(_), ..] => Err(HeaderError::UnquotedDescription),
            short => Err(HeaderError::MissingFields { found: short.len() }),
        }
    }

    /// Headword the definition belongs to.
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Identifier of the database that supplied the definition.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Human-readable database description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The header line as received.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DefinitionHeader {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "@ \"{}\"", self.description)
    }
}

/// Errors raised while parsing a `151` header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// The line does not start with `151`.
    #[error("line is not a definition header")]
    NotAHeader,
    /// A double-quoted segment was opened but never closed.
    #[error("unterminated quoted segment in definition header")]
    UnterminatedQuote,
    /// Fewer than the three positional fields were present.
    #[error("definition header has {found} field(s), expected word, database and description")]
    MissingFields {
        /// Number of fields found after the code.
        found: usize,
    },
    /// The description field was a bare token.
    #[error("definition header description is not quoted")]
    UnquotedDescription,
}

#[derive(Debug, PartialEq, Eq)]
enum Field {
    Bare(String),
    Quoted(String),
}

impl Field {
    fn value(&self) -> &str {
        match self {
            Self::Bare(value) | Self::Quoted(value) => value,
        }
    }
}

fn split_fields(input: &str) -> Result<Vec<Field>, HeaderError> {
    let mut fields = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        if let Some(opened) = rest.strip_prefix('"') {
            let end = opened.find('"').ok_or(HeaderError::UnterminatedQuote)?;
            let (value, tail) = opened.split_at(end);
            fields.push(Field::Quoted(value.to_owned()));
            rest = tail.get(1..).unwrap_or_default().trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (value, tail) = rest.split_at(end);
            fields.push(Field::Bare(value.to_owned()));
            rest = tail.trim_start();
        }
    }
    Ok(fields)
}
