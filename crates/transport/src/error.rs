//! Transport Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. See `ERRORS.md` for design rationale.

use derive_more::{Display, Error};

/// A transport error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing is listening (reference manager not running, or wrong port).
    #[display("could not connect to {_0}")]
    Connection(#[error(not(source))] String),
    /// The request was sent but no response arrived in time.
    #[display("request timed out")]
    Timeout,
    /// The service answered with a non-success HTTP status.
    #[display("unexpected HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    /// The request URL could not be constructed.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The request could not be built or sent for a reason other than
    /// connectivity (for example an invalid header or body).
    #[display("could not send request")]
    Request,
    /// The response body could not be read.
    #[display("could not read response body")]
    Body,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Classify a [`reqwest::Error`], keeping it as a child in the error tree.
    #[track_caller]
    pub fn http(err: reqwest::Error) -> Error {
        let kind = if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.url().map(|u| u.to_string()).unwrap_or_else(|| "service".to_string()))
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else {
            Self::Request
        };
        exn::Exn::from(err).raise(kind)
    }
}
