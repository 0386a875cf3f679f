//! Operations on whole libraries, and the caches built from them.

use crate::Client;
use crate::error::{ErrorKind, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use zotlink_cache::CiteKeySnapshot;
use zotlink_protocol::models::{CiteKeyExport, Group, library_id, parse_export_rows};
use zotlink_protocol::{CITEKEY_EXPORT_FORMAT, EXPORT_PATH, PROBE_PATH, PROBE_READY, method, parse_result_as, search_library};

/// Path of the bulk citation key export for one library.
pub(crate) fn export_path(group_id: u64, group_name: &str) -> String {
    format!("{EXPORT_PATH}?/{group_id}/{}.{CITEKEY_EXPORT_FORMAT}", urlencoding::encode(group_name))
}

impl Client {
    /// Whether the service is up. Queued like every other request.
    #[instrument(skip(self))]
    pub async fn is_running(&self) -> bool {
        match self.fetch(PROBE_PATH).await {
            Ok(body) => body.trim() == PROBE_READY,
            Err(err) => {
                tracing::debug!(error = ?err, "Service is not running");
                false
            },
        }
    }

    /// The libraries the user can access.
    #[instrument(skip(self))]
    pub async fn groups(&self) -> Option<Vec<Group>> {
        let result = self.groups_inner().await;
        self.settle("groups", result.map(Some))
    }

    async fn groups_inner(&self) -> Result<Vec<Group>> {
        let body = self.request(method::GROUPS, json!([])).await?;
        parse_result_as(&body, "list of groups").map_err(ErrorKind::protocol)
    }

    /// Citation keys and titles of every item in one library.
    ///
    /// Rows without a citation key or a title are skipped.
    #[instrument(skip(self))]
    pub async fn export_citekeys(&self, group_id: u64, group_name: &str) -> Option<Vec<CiteKeyExport>> {
        let result = self.export_citekeys_inner(group_id, group_name).await;
        self.settle("export_citekeys", result.map(Some))
    }

    async fn export_citekeys_inner(&self, group_id: u64, group_name: &str) -> Result<Vec<CiteKeyExport>> {
        let body = self.fetch(&export_path(group_id, group_name)).await?;
        parse_export_rows(&body, group_id).map_err(ErrorKind::protocol)
    }

    /// Citation keys across every library.
    ///
    /// The export is expensive, so it's cached for
    /// [`REFRESH_INTERVAL`](zotlink_cache::REFRESH_INTERVAL) unless `force` is
    /// set. When the service can't be reached the last known export (possibly
    /// empty) is returned instead, marked as coming from the cache.
    #[instrument(skip(self))]
    pub async fn all_citekeys(&self, force: bool) -> CiteKeySnapshot {
        if !force && let Some(citekeys) = self.caches.fresh_citekeys().await {
            tracing::debug!(count = citekeys.len(), "Citation key cache is fresh");
            return CiteKeySnapshot::cached(citekeys);
        }
        if !self.is_running().await {
            tracing::debug!("Service unavailable, serving cached citation keys");
            return CiteKeySnapshot::cached(self.caches.citekeys().await);
        }
        let groups = match self.groups_inner().await {
            Ok(groups) => groups,
            Err(err) => {
                tracing::warn!(error = ?err, "Could not list libraries, serving cached citation keys");
                return CiteKeySnapshot::cached(self.caches.citekeys().await);
            },
        };
        let mut citekeys = Vec::new();
        for group in &groups {
            match self.export_citekeys_inner(group.id, &group.name).await {
                Ok(rows) => citekeys.extend(rows),
                Err(err) => tracing::warn!(group = %group, error = ?err, "Skipping library in citation key export"),
            }
        }
        self.caches.replace_citekeys(citekeys).await
    }

    /// The library an item lives in, by its citation key.
    ///
    /// Resolved through a search and the library list, then remembered for
    /// the rest of the session. An unknown citation key is not an error.
    #[instrument(skip(self))]
    pub async fn library_for_citekey(&self, citekey: &str) -> Option<u64> {
        if let Some(id) = self.caches.library_id(citekey).await {
            return Some(id);
        }
        let result = self.library_for_citekey_inner(citekey).await;
        self.settle("library_for_citekey", result)
    }

    async fn library_for_citekey_inner(&self, citekey: &str) -> Result<Option<u64>> {
        let body = self.request(method::SEARCH, json!([citekey])).await?;
        let records: Vec<serde_json::Value> =
            parse_result_as(&body, "list of search results").map_err(ErrorKind::protocol)?;
        let Some(name) = search_library(&records, citekey) else {
            tracing::debug!(results = records.len(), "No search result for this exact citation key");
            return Ok(None);
        };
        let groups = self.cached_groups().await?;
        let Some(id) = library_id(&groups, name) else {
            tracing::debug!(library = name, "Library not in the group list");
            return Ok(None);
        };
        self.caches.remember_library_id(citekey, id).await;
        Ok(Some(id))
    }

    /// The group list, fetched at most once per session.
    async fn cached_groups(&self) -> Result<Arc<Vec<Group>>> {
        if let Some(groups) = self.caches.groups().await {
            return Ok(groups);
        }
        let groups = self.groups_inner().await?;
        Ok(self.caches.set_groups(groups).await)
    }
}
