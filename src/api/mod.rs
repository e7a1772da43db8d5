//! File service API client.
//!
//! | Operation | Method | Path          | Auth |
//! |-----------|--------|---------------|------|
//! | list      | GET    | `/files`      | no   |
//! | upload    | POST   | `/files`      | yes  |
//! | delete    | DELETE | `/files/{id}` | yes  |
//! | download  | GET    | `/files/{id}` | no   |

mod client;
mod error;
mod types;

use std::path::PathBuf;

use async_trait::async_trait;

pub use client::{ApiClient, RequestBody, RequestOptions};
pub use error::{ApiError, GENERIC_ERROR_MESSAGE};
pub use types::{FileRecord, ListResponse, SingleResponse, UploadPayload};

use crate::Result;

/// Operations the file store drives.
///
/// Implemented by [`ApiClient`] against the real service; tests provide
/// in-memory implementations.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// List all files, in server order.
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    /// Upload a file and return the created record.
    async fn upload_file(&self, payload: &UploadPayload) -> Result<FileRecord>;

    /// Delete a file by ID.
    async fn delete_file(&self, id: i64) -> Result<()>;

    /// Download a file and save it under `filename`. Returns the saved path.
    async fn download_file(&self, id: i64, filename: &str) -> Result<PathBuf>;
}
