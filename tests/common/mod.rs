//! Test helpers shared by the integration tests.
//!
//! Provides a scripted in-memory `FileApi` and record fixtures.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use filedesk::{ApiError, FileApi, FileRecord, FiledeskError, Result, UploadPayload};

/// Build a record with sensible defaults.
pub fn sample_file(id: i64, created_at: Option<&str>) -> FileRecord {
    FileRecord {
        id,
        original_name: "contract.pdf".to_string(),
        description: Some("Signed contract".to_string()),
        mime_type: Some("application/pdf".to_string()),
        size: 1024,
        disk: "local".to_string(),
        path: "files/contract.pdf".to_string(),
        download_url: format!("http://localhost/files/{id}"),
        created_at: created_at.map(str::to_string),
    }
}

/// Service error with the given message.
pub fn api_error(message: &str) -> FiledeskError {
    ApiError::new(message, 422, None).into()
}

/// Scripted `FileApi`.
///
/// Each operation pops its next queued result; when the queue is empty list
/// returns no files, delete and download succeed, and upload fails. Every
/// call waits `latency` first so overlapping calls really overlap.
#[derive(Default)]
pub struct MockFileApi {
    pub latency: Duration,
    list_results: Mutex<VecDeque<Result<Vec<FileRecord>>>>,
    upload_results: Mutex<VecDeque<Result<FileRecord>>>,
    delete_results: Mutex<VecDeque<Result<()>>>,
    download_results: Mutex<VecDeque<Result<PathBuf>>>,
    pub list_calls: Mutex<usize>,
    pub upload_calls: Mutex<Vec<UploadPayload>>,
    pub delete_calls: Mutex<Vec<i64>>,
    pub download_calls: Mutex<Vec<(i64, String)>>,
}

impl MockFileApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn push_list(&self, result: Result<Vec<FileRecord>>) {
        self.list_results.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: Result<FileRecord>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<()>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    pub fn push_download(&self, result: Result<PathBuf>) {
        self.download_results.lock().unwrap().push_back(result);
    }

    pub fn delete_calls(&self) -> Vec<i64> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<(i64, String)> {
        self.download_calls.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl FileApi for MockFileApi {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        *self.list_calls.lock().unwrap() += 1;
        self.wait().await;
        let next = self.list_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn upload_file(&self, payload: &UploadPayload) -> Result<FileRecord> {
        self.upload_calls.lock().unwrap().push(payload.clone());
        self.wait().await;
        let next = self.upload_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(FiledeskError::Validation("no upload queued".to_string())))
    }

    async fn delete_file(&self, id: i64) -> Result<()> {
        self.delete_calls.lock().unwrap().push(id);
        self.wait().await;
        let next = self.delete_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn download_file(&self, id: i64, filename: &str) -> Result<PathBuf> {
        self.download_calls
            .lock()
            .unwrap()
            .push((id, filename.to_string()));
        self.wait().await;
        let next = self.download_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(PathBuf::from(filename)))
    }
}
