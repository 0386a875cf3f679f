use serde::Serialize;
use std::sync::Arc;
use time::{Duration, UtcDateTime};
use zotlink_protocol::models::CiteKeyExport;

/// How long a citation key export stays fresh.
pub const REFRESH_INTERVAL: Duration = Duration::seconds(60);

/// The citation key export as handed out to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiteKeySnapshot {
    pub citekeys: Arc<Vec<CiteKeyExport>>,
    /// `true` when the snapshot wasn't rebuilt for this request, either
    /// because it was still fresh or because the service couldn't be reached.
    pub from_cache: bool,
}
impl CiteKeySnapshot {
    pub fn cached(citekeys: Arc<Vec<CiteKeyExport>>) -> Self {
        Self { citekeys, from_cache: true }
    }

    pub fn refreshed(citekeys: Arc<Vec<CiteKeyExport>>) -> Self {
        Self { citekeys, from_cache: false }
    }

    pub fn len(&self) -> usize {
        self.citekeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citekeys.is_empty()
    }
}

/// The stored export and when it was taken.
#[derive(Debug, Clone, Default)]
pub(crate) struct Stored {
    pub(crate) citekeys: Arc<Vec<CiteKeyExport>>,
    pub(crate) refreshed_at: Option<UtcDateTime>,
}
impl Stored {
    pub(crate) fn is_fresh_at(&self, now: UtcDateTime) -> bool {
        self.refreshed_at.is_some_and(|at| now - at < REFRESH_INTERVAL)
    }
}
