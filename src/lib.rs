//! filedesk - file manager client.
//!
//! Lists, uploads, deletes and downloads files against a REST file service,
//! and keeps the observable state (loading flags, per-file deletion, pending
//! download, errors, toast notifications) a UI layer renders from.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;

pub use api::{ApiClient, ApiError, FileApi, FileRecord, UploadPayload};
pub use config::Config;
pub use download::{DirectorySink, SaveSink};
pub use error::{FiledeskError, Result};
pub use format::{format_bytes, format_date_time};
pub use store::{FileStore, FilesSnapshot, StoreEvent, Toast, ToastVariant};
