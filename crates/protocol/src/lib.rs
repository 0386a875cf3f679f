//! Better BibTeX JSON-RPC wire format.
//!
//! Everything here is synchronous and side-effect free: response bodies go
//! in, typed values come out. Talking to the service is the transport's job.

mod consts;
mod envelope;
pub mod error;
mod item;
mod markdown;
pub mod models;

pub use crate::consts::{
    CITEKEY_EXPORT_FORMAT, DATE_TRANSLATOR, EXPORT_PATH, ITEM_TRANSLATOR, PROBE_PATH, PROBE_READY, method,
};
pub use crate::envelope::{parse_result, parse_result_as};
pub use crate::item::{citation_keys, citekey_of, merge_relations, normalize_export, placeholder, search_library};
pub use crate::markdown::{html_to_markdown, is_empty_fragment};
