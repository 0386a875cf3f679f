use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

/// One row of the bulk citation key export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiteKeyExport {
    #[serde(rename = "libraryID")]
    pub library_id: u64,
    pub citekey: String,
    pub title: String,
}
impl CiteKeyExport {
    pub fn new(library_id: u64, citekey: impl Into<String>, title: impl Into<String>) -> Self {
        Self { library_id, citekey: citekey.into(), title: title.into() }
    }
}

/// Parse the body of the library export endpoint into rows tagged with
/// `library_id`.
///
/// Rows without a citation key or without a title are dropped, and the
/// remaining rows keep their relative order.
#[instrument(level = "debug", skip(body), fields(body_size = body.len()))]
pub fn parse_export_rows(body: &str, library_id: u64) -> Result<Vec<CiteKeyExport>> {
    let rows: Vec<Value> = serde_json::from_str(body).or_raise(|| ErrorKind::InvalidJson)?;
    let total = rows.len();
    let exports: Vec<CiteKeyExport> = rows
        .iter()
        .filter_map(|row| {
            let citekey = text_field(row, &["citation-key", "citekey", "citationKey"])?;
            let title = text_field(row, &["title"])?;
            Some(CiteKeyExport::new(library_id, citekey, title))
        })
        .collect();
    if exports.len() < total {
        tracing::debug!(dropped = total - exports.len(), "Dropped incomplete export rows");
    }
    Ok(exports)
}

fn text_field<'a>(row: &'a Value, names: &[&str]) -> Option<&'a str> {
    names.iter().filter_map(|name| row.get(*name)?.as_str()).find(|v| !v.is_empty())
}
