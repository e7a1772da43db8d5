//! Saving downloaded files to disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;

/// Name used when a filename sanitizes down to nothing.
const FALLBACK_FILENAME: &str = "download";

/// Destination for downloaded file contents.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist `bytes` under (a sanitized form of) `filename`.
    ///
    /// Returns the path the file ended up at.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Saves downloads into a directory.
///
/// Contents are written to a hidden part-file first and renamed into place.
/// The part-file is removed whether or not the save succeeds. Existing files
/// are never overwritten; a ` (n)` suffix is added instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `directory` (created on first save).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn write_part(&self, part: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(part, bytes).await?;
        tokio::fs::rename(part, target).await?;
        Ok(())
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let target = unique_target(&self.directory, &sanitize_filename(filename)).await?;
        let part = self.directory.join(format!(".{}.part", Uuid::new_v4()));

        let result = self.write_part(&part, &target, bytes).await;

        match tokio::fs::remove_file(&part).await {
            Ok(()) => debug!(path = %part.display(), "removed part file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %part.display(), error = %e, "failed to remove part file"),
        }

        result.map(|()| target)
    }
}

/// Reduce a server-supplied filename to a safe single path component.
///
/// Directory parts and control characters are stripped.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// First free path for `name` in `dir`: `name`, then `stem (1).ext`, ...
async fn unique_target(dir: &Path, name: &str) -> Result<PathBuf> {
    let candidate = dir.join(name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string();
    let extension = path.extension().and_then(|e| e.to_str());

    let mut n = 1u32;
    loop {
        let numbered = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(numbered);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}
