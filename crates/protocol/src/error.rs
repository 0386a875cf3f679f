//! Protocol Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. See `ERRORS.md` for design rationale.

use derive_more::{Display, Error};

/// A protocol error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for response parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service answered with a JSON-RPC `error` envelope.
    #[display("{_0}")]
    Remote(#[error(not(source))] String),
    /// The response body isn't JSON at all.
    #[display("response is not valid JSON")]
    InvalidJson,
    /// The envelope carries neither a `result` nor an `error`.
    #[display("response has no result")]
    MissingResult,
    /// The JSON is valid but not shaped like the named structure.
    #[display("unexpected response shape, expected {_0}")]
    UnexpectedShape(#[error(not(source))] &'static str),
    /// A value supplied by the caller could not be parsed.
    #[display("failed to parse {field}, found value: {value}")]
    ParseError {
        /// The kind of value that failed to parse.
        field: &'static str,
        /// The offending input.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same request, same answer.
        false
    }
}
