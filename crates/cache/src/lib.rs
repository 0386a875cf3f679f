//! In-memory caches for responses from the Better BibTeX service.
//!
//! The service is the source of truth; everything here only approximates it
//! and is rebuilt from scratch in a new session. Nothing is persisted.
//!
//! # Architecture
//! [`Caches`] holds three independent caches:
//! - **Library ids**: citation key to library id, filled one key at a time and
//!   never invalidated.
//! - **Groups**: the libraries the user can access, fetched once.
//! - **Citation keys**: the full citation key export across every library,
//!   considered fresh for [`REFRESH_INTERVAL`].
//!
//! Snapshots are always swapped in whole behind an [`Arc`](std::sync::Arc),
//! so a reader holding an older snapshot is never affected by a refresh.

mod caches;
mod snapshot;

pub use crate::caches::Caches;
pub use crate::snapshot::{CiteKeySnapshot, REFRESH_INTERVAL};
