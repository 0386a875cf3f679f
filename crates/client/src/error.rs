//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. See `ERRORS.md` for design rationale.
//!
//! None of these cross a public operation: they are turned into a notice and
//! a log event, and the operation returns nothing.

use derive_more::{Display, Error};
use zotlink_config::error::Error as ConfigError;
use zotlink_protocol::error::Error as ProtocolError;
use zotlink_transport::error::Error as TransportError;

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shown when the service renders an empty bibliography.
pub const EMPTY_BIBLIOGRAPHY_HINT: &str = "The bibliography came back empty. Check that Quick Copy in the reference \
     manager's Export preferences is set to a citation style (not an export format), or pass a CSL style explicitly.";

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service couldn't be reached, or didn't answer properly.
    #[display("cannot reach Better BibTeX: {_0}")]
    Transport(#[error(not(source))] String),
    /// The service answered, but not with anything usable.
    #[display("unexpected response from Better BibTeX: {_0}")]
    Protocol(#[error(not(source))] String),
    /// The citation processor rendered nothing.
    #[display("{}", EMPTY_BIBLIOGRAPHY_HINT)]
    EmptyBibliography,
    /// The client couldn't be set up from the configuration.
    #[display("invalid configuration: {_0}")]
    Config(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The reference manager may simply not have been started yet.
        matches!(self, Self::Transport(_))
    }

    /// Wrap a transport failure, keeping it as a child in the error tree.
    #[track_caller]
    pub(crate) fn transport(err: TransportError) -> Error {
        let kind = Self::Transport((*err).to_string());
        err.raise(kind)
    }

    /// Wrap a configuration failure, keeping it as a child in the error tree.
    #[track_caller]
    pub(crate) fn config(err: ConfigError) -> Error {
        let kind = Self::Config((*err).to_string());
        err.raise(kind)
    }

    /// Wrap a protocol failure, keeping it as a child in the error tree.
    #[track_caller]
    pub(crate) fn protocol(err: ProtocolError) -> Error {
        let kind = Self::Protocol((*err).to_string());
        err.raise(kind)
    }
}
