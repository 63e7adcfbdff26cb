//! Upload targets and server-side file metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::UploadError;

/// Where the bytes of an upload come from.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Streamed from disk when the request is sent
    Path(PathBuf),
    /// Already in memory (drops that carry bytes instead of a path)
    Bytes(Arc<[u8]>),
}

/// A file the user picked or dropped, waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub name: String,
    pub size: u64,
    pub source: UploadSource,
}

impl UploadTarget {
    /// Build a target from a path on disk, reading its size from metadata.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if meta.is_dir() {
            return Err(UploadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "is a directory"),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: meta.len(),
            source: UploadSource::Path(path.to_path_buf()),
        })
    }

    /// Build a target from bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: UploadSource::Bytes(bytes),
        }
    }
}

/// Metadata for a file already stored on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    /// Raw timestamp as sent by the server (RFC 3339)
    pub upload_time: String,
}

impl FileRecord {
    /// Parsed `upload_time`, or `None` when the server sent something that is not RFC 3339.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.upload_time.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Body of `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Missing counts as `false`
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file: Option<FileRecord>,
}

/// Sort newest first. Records whose timestamp does not parse go last.
pub fn sort_newest_first(records: &mut [FileRecord]) {
    records.sort_by(|a, b| b.uploaded_at().cmp(&a.uploaded_at()));
}
