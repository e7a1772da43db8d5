//! Mutable state behind a [`FileStore`](super::FileStore) and its derivations.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::toast::Toast;
use crate::api::FileRecord;
use crate::format::parse_timestamp;

/// Everything a renderer needs, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesSnapshot {
    /// Files, most recent first.
    pub files: Vec<FileRecord>,
    /// Whether the collection is non-empty.
    pub has_files: bool,
    /// A list fetch is in flight.
    pub loading: bool,
    /// An upload is in flight.
    pub uploading: bool,
    /// IDs with a delete in flight, ascending.
    pub deleting_ids: Vec<i64>,
    /// ID of the file currently downloading.
    pub pending_download_id: Option<i64>,
    /// Last error message.
    pub error: Option<String>,
    /// When the collection was last changed to a non-empty value.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Current toast.
    pub toast: Toast,
}

/// Change notification sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The raw collection changed.
    FilesChanged,
    /// The loading flag changed.
    LoadingChanged(bool),
    /// The uploading flag changed.
    UploadingChanged(bool),
    /// An ID entered or left the deleting set.
    DeletingChanged {
        /// File ID.
        id: i64,
        /// Whether it is now being deleted.
        deleting: bool,
    },
    /// The pending download changed.
    DownloadChanged(Option<i64>),
    /// The error message changed.
    ErrorChanged(Option<String>),
    /// The toast was set or cleared.
    ToastChanged(Toast),
}

#[derive(Debug, Default)]
pub(crate) struct FileState {
    pub(crate) raw_files: Vec<FileRecord>,
    pub(crate) loading: bool,
    pub(crate) uploading: bool,
    pub(crate) deleting_ids: HashSet<i64>,
    pub(crate) pending_download_id: Option<i64>,
    pub(crate) error: Option<String>,
    pub(crate) last_synced_at: Option<DateTime<Utc>>,
    pub(crate) toast: Toast,
    pub(crate) toast_generation: u64,
    pub(crate) toast_timer: Option<JoinHandle<()>>,
}

impl FileState {
    /// Replace the collection wholesale. Later duplicates of an ID are dropped.
    pub(crate) fn replace_files(&mut self, files: Vec<FileRecord>) {
        let mut seen = HashSet::with_capacity(files.len());
        self.raw_files = files.into_iter().filter(|f| seen.insert(f.id)).collect();
        self.touch_synced();
    }

    /// Put a record first, replacing any stale entry with the same ID.
    pub(crate) fn prepend_file(&mut self, record: FileRecord) {
        self.raw_files.retain(|f| f.id != record.id);
        self.raw_files.insert(0, record);
        self.touch_synced();
    }

    /// Drop the record with `id`. Returns true if one was removed.
    pub(crate) fn remove_file(&mut self, id: i64) -> bool {
        let before = self.raw_files.len();
        self.raw_files.retain(|f| f.id != id);
        let removed = self.raw_files.len() != before;
        if removed {
            self.touch_synced();
        }
        removed
    }

    fn touch_synced(&mut self) {
        if !self.raw_files.is_empty() {
            self.last_synced_at = Some(Utc::now());
        }
    }

    pub(crate) fn snapshot(&self) -> FilesSnapshot {
        let mut deleting_ids: Vec<i64> = self.deleting_ids.iter().copied().collect();
        deleting_ids.sort_unstable();

        FilesSnapshot {
            files: sort_by_recency(&self.raw_files),
            has_files: !self.raw_files.is_empty(),
            loading: self.loading,
            uploading: self.uploading,
            deleting_ids,
            pending_download_id: self.pending_download_id,
            error: self.error.clone(),
            last_synced_at: self.last_synced_at,
            toast: self.toast.clone(),
        }
    }
}

/// Sort key: creation time in epoch milliseconds, 0 when missing or unparseable.
fn recency_key(file: &FileRecord) -> i64 {
    file.created_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Files ordered by `created_at` descending. Ties keep collection order.
pub fn sort_by_recency(files: &[FileRecord]) -> Vec<FileRecord> {
    let mut sorted = files.to_vec();
    sorted.sort_by_cached_key(|f| std::cmp::Reverse(recency_key(f)));
    sorted
}
