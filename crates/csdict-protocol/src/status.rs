//! Status line parsing.
//!
//! Every server reply starts with a line of the form `NNN free text`. Block
//! boundaries are detected by a literal three-digit prefix test rather than a
//! full parse, so [`StatusCode::prefixes`] is the primitive the reply reader
//! builds on.

use std::fmt;

use thiserror::Error;

/// Three-digit numeric status code carried by a server line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// `110`: database list follows.
    pub const DATABASE_LIST: Self = Self(110);
    /// `150`: one or more definitions follow.
    pub const DEFINITIONS_FOLLOW: Self = Self(150);
    /// `151`: header for a single definition inside a `150` block.
    pub const DEFINITION_HEADER: Self = Self(151);
    /// `152`: match results follow.
    pub const MATCHES_FOLLOW: Self = Self(152);
    /// `220`: connection greeting.
    pub const GREETING: Self = Self(220);
    /// `250`: block terminator and end of transaction.
    pub const OK: Self = Self(250);
    /// `552`: no match or no definition.
    pub const NO_MATCH: Self = Self(552);

    /// Builds a code from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns true when the code announces a body closed by `250`.
    #[must_use]
    pub const fn opens_block(self) -> bool {
        matches!(self.0, 110 | 150 | 152)
    }

    /// Returns true when `line` starts with this code's three digits.
    ///
    /// This is a plain prefix test: `"2500 apples"` and `"250 ok"` both match
    /// `250`. Body lines are assumed never to begin with a bare code.
    #[must_use]
    pub fn prefixes(self, line: &str) -> bool {
        leading_code(line) == Some(self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:03}", self.0)
    }
}

/// A parsed status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    code: StatusCode,
    text: String,
    raw: String,
}

impl StatusLine {
    /// Parses a line whose first three characters are ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Malformed`] when the line does not start with a
    /// three-digit code.
    pub fn parse(line: &str) -> Result<Self, StatusError> {
        let code = leading_code(line).ok_or_else(|| StatusError::Malformed {
            line: line.to_owned(),
        })?;
        let text = line.get(3..).unwrap_or_default().trim_start();
        Ok(Self {
            code: StatusCode(code),
            text: text.to_owned(),
            raw: line.to_owned(),
        })
    }

    /// Status code of the line.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Free text following the code.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The line exactly as received, without its line terminator.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.raw)
    }
}

/// Errors raised while parsing status lines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// The line did not begin with a three-digit code.
    #[error("malformed status line: {line:?}")]
    Malformed {
        /// The rejected line.
        line: String,
    },
}

fn leading_code(line: &str) -> Option<u16> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
