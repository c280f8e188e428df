//! Wire vocabulary for the DICT lookup protocol.
//!
//! The crate models the small subset of RFC 2229 the `csdict` client speaks:
//! status lines with three-digit codes, multi-line reply blocks closed by a
//! `250` terminator, the `151` per-definition header, and the request lines
//! the client sends. Everything here works over `BufRead`/`Write` generics so
//! the session can plug in a TCP stream while tests feed in-memory cursors.

mod header;
mod reply;
mod request;
mod status;

pub use header::{DefinitionHeader, HeaderError};
pub use reply::{BodyLine, Reply, ReplyError, ReplyReader};
pub use request::{DEFAULT_DATABASE, MatchStrategy, Request};
pub use status::{StatusCode, StatusError, StatusLine};
