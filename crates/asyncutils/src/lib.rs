//! Async utilities shared between the zotlink crates.
//!
//! The only resident at the moment is [`SerialQueue`]: a FIFO admission gate
//! that allows exactly one caller at a time to talk to the Better BibTeX
//! service. The service serializes requests internally and gets unhappy when
//! it's hammered with parallel calls, so every remote call in
//! `zotlink-client` takes a [`Turn`] first.

mod queue;

pub use crate::queue::{SerialQueue, Ticket, Turn};
