//! Configuration for talking to a local Better BibTeX service.
//!
//! The service listens on `127.0.0.1`; which port depends on the reference
//! manager in use (see [`resolve_port`]). Everything else in [`Config`] is
//! request tuning and bibliography defaults.

mod config;
mod database;
pub mod error;

pub use crate::config::{BibliographyConfig, BibliographyFormat, Config};
pub use crate::database::{Database, DatabaseWithPort, JURIS_M_PORT, ZOTERO_PORT, resolve_port};
