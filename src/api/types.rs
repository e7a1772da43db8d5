//! Wire types exchanged with the file service.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FiledeskError, Result};

/// Metadata for one file stored by the file service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Server-assigned file ID.
    pub id: i64,
    /// Original filename (display name).
    pub original_name: String,
    /// File description.
    #[serde(default)]
    pub description: Option<String>,
    /// MIME type reported by the server.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size: i64,
    /// Storage backend tag.
    pub disk: String,
    /// Storage path on the backend.
    pub path: String,
    /// URL the file can be fetched from.
    pub download_url: String,
    /// Creation timestamp (ISO-8601).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Envelope for `GET /files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Files in server order.
    pub data: Vec<FileRecord>,
}

/// Envelope for single-record responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleResponse {
    /// The record.
    pub data: FileRecord,
}

/// A file to upload, with an optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    /// Name the file is uploaded under.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Explicit MIME type. Guessed from the name when absent.
    pub mime_type: Option<String>,
    /// Optional description field.
    pub description: Option<String>,
}

impl UploadPayload {
    /// Create a payload from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime_type: None,
            description: None,
        }
    }

    /// Read a local file into a payload named after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                FiledeskError::Validation(format!("not a file path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    /// Set the description. Blank descriptions are dropped.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    /// Set the MIME type explicitly.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// MIME type sent with the file part.
    pub fn content_type(&self) -> String {
        match &self.mime_type {
            Some(mime) => mime.clone(),
            None => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_record_deserialize() {
        let value = json!({
            "id": 7,
            "original_name": "contract.pdf",
            "description": null,
            "mime_type": "application/pdf",
            "size": 2048,
            "disk": "local",
            "path": "files/contract.pdf",
            "download_url": "http://localhost/files/7",
            "created_at": "2024-01-01T10:00:00Z"
        });

        let record: FileRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.original_name, "contract.pdf");
        assert!(record.description.is_none());
        assert_eq!(record.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01T10:00:00Z"));
    }

    #[test]
    fn test_file_record_missing_optionals() {
        let value = json!({
            "id": 1,
            "original_name": "a.txt",
            "size": 1,
            "disk": "s3",
            "path": "a.txt",
            "download_url": "http://localhost/files/1"
        });

        let record: FileRecord = serde_json::from_value(value).unwrap();
        assert!(record.created_at.is_none());
        assert!(record.mime_type.is_none());
    }

    #[test]
    fn test_upload_payload_content_type() {
        let payload = UploadPayload::new("report.pdf", b"%PDF".to_vec());
        assert_eq!(payload.content_type(), "application/pdf");

        let payload = UploadPayload::new("blob", vec![0u8]);
        assert_eq!(payload.content_type(), "application/octet-stream");

        let payload = UploadPayload::new("notes.txt", vec![]).with_mime_type("text/markdown");
        assert_eq!(payload.content_type(), "text/markdown");
    }

    #[test]
    fn test_upload_payload_blank_description() {
        let payload = UploadPayload::new("a.txt", vec![]).with_description("");
        assert!(payload.description.is_none());

        let payload = UploadPayload::new("a.txt", vec![]).with_description("Signed");
        assert_eq!(payload.description.as_deref(), Some("Signed"));
    }

    #[tokio::test]
    async fn test_upload_payload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dummy.txt");
        std::fs::write(&path, "dummy").unwrap();

        let payload = UploadPayload::from_path(&path).await.unwrap();
        assert_eq!(payload.file_name, "dummy.txt");
        assert_eq!(payload.bytes, b"dummy");
    }

    #[tokio::test]
    async fn test_upload_payload_from_missing_path() {
        let result = UploadPayload::from_path("/definitely/not/here.txt").await;
        assert!(matches!(result, Err(FiledeskError::Io(_))));
    }
}
