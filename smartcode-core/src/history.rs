//! Capped, newest-first log of recent reviews, persisted in local storage.
//!
//! The whole list is stored as one JSON array under [`HISTORY_KEY`]. Storage is
//! best-effort: read and write failures are logged and never surfaced, and a
//! missing or unparseable value loads as an empty history.

use crate::db::{now_millis, LocalStorage};
use crate::types::{ReviewResult, StoredReview};

/// Storage key of the persisted history array.
pub const HISTORY_KEY: &str = "review_history";

/// Maximum number of entries kept.
pub const HISTORY_LIMIT: usize = 10;

/// In-memory history backed by a [`LocalStorage`] handle.
pub struct HistoryStore {
    storage: LocalStorage,
    entries: Vec<StoredReview>,
}

impl HistoryStore {
    /// Hydrates the history from storage. This is the only read path.
    pub async fn load(storage: LocalStorage) -> Self {
        let entries = match storage.get_item(HISTORY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<StoredReview>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_LIMIT);
                    entries
                }
                Err(e) => {
                    tracing::warn!("discarding unreadable review history: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("review history unavailable: {e}");
                Vec::new()
            }
        };
        tracing::debug!(count = entries.len(), "review history loaded");
        Self { storage, entries }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[StoredReview] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepends `result` unless the newest entry has identical reasoning.
    ///
    /// Returns `true` when an entry was added. The list is truncated to
    /// [`HISTORY_LIMIT`] and persisted in full.
    pub async fn record(&mut self, result: &ReviewResult) -> bool {
        self.record_at(result, now_millis()).await
    }

    async fn record_at(&mut self, result: &ReviewResult, now: i64) -> bool {
        if self.entries.first().is_some_and(|head| head.review.reasoning == result.reasoning) {
            return false;
        }

        // Ids are time-derived; bump past the head so two records in one
        // millisecond still get distinct ids.
        let id_value = match self.entries.first().and_then(|h| h.id.parse::<i64>().ok()) {
            Some(head) if head >= now => head + 1,
            _ => now,
        };

        self.entries.insert(
            0,
            StoredReview { review: result.clone(), id: id_value.to_string(), timestamp: now },
        );
        self.entries.truncate(HISTORY_LIMIT);
        self.persist().await;
        true
    }

    /// Empties memory and storage. Callers confirm with the user first.
    pub async fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove_item(HISTORY_KEY).await {
            tracing::warn!("failed to clear review history: {e}");
        }
    }

    /// Looks up an entry for display. Ordering is unchanged.
    pub fn select(&self, id: &str) -> Option<&StoredReview> {
        self.entries.iter().find(|e| e.id == id)
    }

    async fn persist(&self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("failed to encode review history: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(HISTORY_KEY, &raw).await {
            tracing::warn!("failed to persist review history: {e}");
        }
    }
}
