//! File state manager.
//!
//! [`FileStore`] owns the file collection the UI renders, drives the four
//! network operations through a [`FileApi`], and tracks the transient state
//! around them (loading, uploading, per-file deletion, pending download,
//! last error, toast). Subscribers are told about every change through a
//! broadcast channel; derived views (sorted list, `has_files`) are computed
//! on read.

mod state;
mod toast;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{FileApi, FileRecord, UploadPayload};
use crate::{FiledeskError, Result};

pub use state::{sort_by_recency, FilesSnapshot, StoreEvent};
pub use toast::{Toast, ToastVariant, TOAST_RESET};

use state::FileState;

/// Maximum number of events buffered per subscriber.
const CHANNEL_CAPACITY: usize = 64;

/// Fallback shown when listing fails for a reason other than a service error.
pub const FETCH_FAILED: &str = "We could not load the document list.";
/// Fallback shown when an upload fails for a reason other than a service error.
pub const UPLOAD_FAILED: &str = "Upload failed. Check the file format and token.";
/// Fallback shown when a delete fails for a reason other than a service error.
pub const DELETE_FAILED: &str = "Delete failed. Retry or verify the token.";
/// Fallback shown when a download fails for a reason other than a service error.
pub const DOWNLOAD_FAILED: &str = "Download failed. The file may no longer exist.";

const UPLOAD_SUCCEEDED: &str = "File uploaded successfully.";
const DELETE_SUCCEEDED: &str = "File deleted.";

/// Message surfaced for a failed operation.
///
/// Service errors carry their own message; anything else (transport,
/// decoding, local I/O) gets the operation's fallback.
pub fn user_message(err: &FiledeskError, fallback: &str) -> String {
    match err.as_api_error() {
        Some(api_err) => api_err.message.clone(),
        None => fallback.to_string(),
    }
}

/// Observable file state plus the operations that change it.
///
/// Cloning is cheap; clones share state and subscribers.
pub struct FileStore<A> {
    api: Arc<A>,
    state: Arc<RwLock<FileState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl<A> Clone for FileStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }
    }
}

impl<A: FileApi> FileStore<A> {
    /// Create a store driving the given API.
    pub fn new(api: A) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            api: Arc::new(api),
            state: Arc::new(RwLock::new(FileState::default())),
            events,
        }
    }

    /// The API this store drives.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // ------------------------------------------------------------------
    // Collection and derived views
    // ------------------------------------------------------------------

    /// The raw collection, in insertion order.
    pub async fn raw_files(&self) -> Vec<FileRecord> {
        self.state.read().await.raw_files.clone()
    }

    /// Replace the raw collection directly.
    ///
    /// Duplicate IDs keep their first occurrence.
    pub async fn set_files(&self, files: Vec<FileRecord>) {
        self.state.write().await.replace_files(files);
        self.emit(StoreEvent::FilesChanged);
    }

    /// Files ordered most recent first.
    pub async fn files(&self) -> Vec<FileRecord> {
        sort_by_recency(&self.state.read().await.raw_files)
    }

    /// Whether the collection is non-empty.
    pub async fn has_files(&self) -> bool {
        !self.state.read().await.raw_files.is_empty()
    }

    /// All observable state at once.
    pub async fn snapshot(&self) -> FilesSnapshot {
        self.state.read().await.snapshot()
    }

    // ------------------------------------------------------------------
    // Transient state
    // ------------------------------------------------------------------

    /// A list fetch is in flight.
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// An upload is in flight.
    pub async fn uploading(&self) -> bool {
        self.state.read().await.uploading
    }

    /// A delete for `id` is in flight.
    pub async fn is_deleting(&self, id: i64) -> bool {
        self.state.read().await.deleting_ids.contains(&id)
    }

    /// ID of the file currently downloading.
    pub async fn pending_download_id(&self) -> Option<i64> {
        self.state.read().await.pending_download_id
    }

    /// Last error message.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// When the collection last changed to a non-empty value.
    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_synced_at
    }

    /// Current toast.
    pub async fn toast(&self) -> Toast {
        self.state.read().await.toast.clone()
    }

    // ------------------------------------------------------------------
    // Toast
    // ------------------------------------------------------------------

    /// Show a toast. It is cleared [`TOAST_RESET`] after the last set.
    pub async fn set_toast(&self, variant: ToastVariant, message: impl Into<String>) {
        let toast = {
            let mut state = self.state.write().await;
            state.toast = Toast {
                variant,
                message: Some(message.into()),
            };
            state.toast_generation += 1;
            let generation = state.toast_generation;
            if let Some(timer) = state.toast_timer.take() {
                timer.abort();
            }
            state.toast_timer = Some(self.schedule_toast_reset(generation));
            state.toast.clone()
        };
        self.emit(StoreEvent::ToastChanged(toast));
    }

    /// Hide the toast now and cancel its pending reset.
    pub async fn clear_toast(&self) {
        let toast = {
            let mut state = self.state.write().await;
            state.toast.message = None;
            state.toast_generation += 1;
            if let Some(timer) = state.toast_timer.take() {
                timer.abort();
            }
            state.toast.clone()
        };
        self.emit(StoreEvent::ToastChanged(toast));
    }

    fn schedule_toast_reset(&self, generation: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(TOAST_RESET).await;

            let toast = {
                let mut state = state.write().await;
                if state.toast_generation != generation {
                    return;
                }
                state.toast.message = None;
                state.toast_timer = None;
                state.toast.clone()
            };
            let _ = events.send(StoreEvent::ToastChanged(toast));
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Reload the collection from the service.
    ///
    /// Failures are recorded in `error` and the toast, never returned.
    pub async fn fetch_files(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
        }
        self.emit(StoreEvent::LoadingChanged(true));
        self.clear_error().await;

        debug!("fetching file list");
        match self.api.list_files().await {
            Ok(files) => {
                info!(count = files.len(), "file list loaded");
                self.set_files(files).await;
            }
            Err(err) => self.handle_error(&err, FETCH_FAILED).await,
        }

        self.state.write().await.loading = false;
        self.emit(StoreEvent::LoadingChanged(false));
    }

    /// Upload a file and put the created record first in the collection.
    ///
    /// Failures are recorded like every other operation and also returned,
    /// so the caller can keep its form open.
    pub async fn upload(&self, payload: &UploadPayload) -> Result<FileRecord> {
        {
            let mut state = self.state.write().await;
            state.uploading = true;
        }
        self.emit(StoreEvent::UploadingChanged(true));
        self.clear_error().await;

        debug!(name = %payload.file_name, bytes = payload.bytes.len(), "uploading file");
        let result = self.api.upload_file(payload).await;

        match &result {
            Ok(record) => {
                self.state.write().await.prepend_file(record.clone());
                self.emit(StoreEvent::FilesChanged);
                self.set_toast(ToastVariant::Success, UPLOAD_SUCCEEDED).await;
            }
            Err(err) => self.handle_error(err, UPLOAD_FAILED).await,
        }

        self.state.write().await.uploading = false;
        self.emit(StoreEvent::UploadingChanged(false));

        result
    }

    /// Delete a file.
    ///
    /// Does nothing if a delete for `id` is already in flight. Failures are
    /// recorded in `error` and the toast, never returned.
    pub async fn remove(&self, id: i64) {
        {
            let mut state = self.state.write().await;
            if !state.deleting_ids.insert(id) {
                debug!(id, "delete already in flight");
                return;
            }
        }
        self.emit(StoreEvent::DeletingChanged { id, deleting: true });
        self.clear_error().await;

        debug!(id, "deleting file");
        match self.api.delete_file(id).await {
            Ok(()) => {
                self.state.write().await.remove_file(id);
                self.emit(StoreEvent::FilesChanged);
                self.set_toast(ToastVariant::Success, DELETE_SUCCEEDED).await;
            }
            Err(err) => self.handle_error(&err, DELETE_FAILED).await,
        }

        self.state.write().await.deleting_ids.remove(&id);
        self.emit(StoreEvent::DeletingChanged {
            id,
            deleting: false,
        });
    }

    /// Download a file under its original name.
    ///
    /// Only one pending download is tracked; a second call overwrites the
    /// indicator but both transfers proceed. Failures are recorded in `error`
    /// and the toast, never returned. Returns the saved path on success.
    pub async fn download(&self, file: &FileRecord) -> Option<PathBuf> {
        self.set_pending_download(Some(file.id)).await;

        debug!(id = file.id, name = %file.original_name, "downloading file");
        let saved = match self.api.download_file(file.id, &file.original_name).await {
            Ok(path) => {
                self.set_toast(
                    ToastVariant::Info,
                    format!("Download for {} started.", file.original_name),
                )
                .await;
                Some(path)
            }
            Err(err) => {
                self.handle_error(&err, DOWNLOAD_FAILED).await;
                None
            }
        };

        self.set_pending_download(None).await;
        saved
    }

    async fn set_pending_download(&self, id: Option<i64>) {
        self.state.write().await.pending_download_id = id;
        self.emit(StoreEvent::DownloadChanged(id));
    }

    async fn clear_error(&self) {
        let had_error = self.state.write().await.error.take().is_some();
        if had_error {
            self.emit(StoreEvent::ErrorChanged(None));
        }
    }

    async fn handle_error(&self, err: &FiledeskError, fallback: &str) {
        let message = user_message(err, fallback);
        warn!(error = %err, "{message}");

        self.state.write().await.error = Some(message.clone());
        self.emit(StoreEvent::ErrorChanged(Some(message.clone())));
        self.set_toast(ToastVariant::Error, message).await;
    }
}
