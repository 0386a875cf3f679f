use crate::snapshot::{CiteKeySnapshot, Stored};
use std::collections::HashMap;
use std::sync::Arc;
use time::UtcDateTime;
use tokio::sync::RwLock;
use zotlink_protocol::models::{CiteKeyExport, Group};

/// Response caches for one client session.
///
/// Locks are only held long enough to read or swap a value, never while the
/// service is being asked for a new one.
#[derive(Debug, Default)]
pub struct Caches {
    library_ids: RwLock<HashMap<String, u64>>,
    groups: RwLock<Option<Arc<Vec<Group>>>>,
    citekeys: RwLock<Stored>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    /// The library a citation key was previously found in.
    pub async fn library_id(&self, citekey: &str) -> Option<u64> {
        let id = self.library_ids.read().await.get(citekey).copied();
        tracing::debug!(citekey, hit = id.is_some(), "Library id cache lookup");
        id
    }

    pub async fn remember_library_id(&self, citekey: impl Into<String>, library_id: u64) {
        self.library_ids.write().await.insert(citekey.into(), library_id);
    }

    /// The groups snapshot, if it has been fetched.
    pub async fn groups(&self) -> Option<Arc<Vec<Group>>> {
        self.groups.read().await.clone()
    }

    /// Store the groups snapshot. If another task got there first, its
    /// snapshot is kept and returned instead.
    pub async fn set_groups(&self, groups: Vec<Group>) -> Arc<Vec<Group>> {
        let mut guard = self.groups.write().await;
        guard.get_or_insert_with(|| Arc::new(groups)).clone()
    }

    /// The current citation key export, however old it is.
    pub async fn citekeys(&self) -> Arc<Vec<CiteKeyExport>> {
        self.citekeys.read().await.citekeys.clone()
    }

    /// The citation key export, only if it was refreshed within
    /// [`REFRESH_INTERVAL`](crate::REFRESH_INTERVAL).
    pub async fn fresh_citekeys(&self) -> Option<Arc<Vec<CiteKeyExport>>> {
        self.fresh_citekeys_at(UtcDateTime::now()).await
    }

    pub async fn fresh_citekeys_at(&self, now: UtcDateTime) -> Option<Arc<Vec<CiteKeyExport>>> {
        let stored = self.citekeys.read().await;
        stored.is_fresh_at(now).then(|| stored.citekeys.clone())
    }

    /// When the citation key export was last rebuilt.
    pub async fn citekeys_refreshed_at(&self) -> Option<UtcDateTime> {
        self.citekeys.read().await.refreshed_at
    }

    /// Replace the citation key export and restart its freshness window.
    pub async fn replace_citekeys(&self, citekeys: Vec<CiteKeyExport>) -> CiteKeySnapshot {
        let citekeys = Arc::new(citekeys);
        *self.citekeys.write().await = Stored { citekeys: citekeys.clone(), refreshed_at: Some(UtcDateTime::now()) };
        tracing::info!(count = citekeys.len(), "Refreshed citation key cache");
        CiteKeySnapshot::refreshed(citekeys)
    }

    /// Mark the citation key export stale without discarding it, so it can
    /// still be served if the service turns out to be unreachable.
    pub async fn expire_citekeys(&self) {
        self.citekeys.write().await.refreshed_at = None;
    }
}
