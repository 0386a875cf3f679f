//! Domain operations against a local Better BibTeX service.
//!
//! [`Client`] ties together the admission queue, the transport and the
//! response caches. Every operation follows the same envelope: wait for a
//! turn, make one request, give the turn back, then parse. Failures never
//! escape an operation; they become a [`Notifier`] notice, a `tracing`
//! event, and a `None`.

mod client;
pub mod error;
mod items;
mod library;
mod notify;
#[cfg(test)]
mod tests;

pub use crate::client::Client;
pub use crate::notify::{Notifier, NotifierHandle, SilentNotifier, TracingNotifier};
pub use zotlink_cache::{CiteKeySnapshot, REFRESH_INTERVAL};
pub use zotlink_config::{BibliographyConfig as BibliographyOptions, BibliographyFormat};
