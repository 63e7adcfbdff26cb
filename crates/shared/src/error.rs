//! Error type shared by the upload client and the UI.
//!
//! Every variant's `Display` is the best-effort message shown to the user,
//! so the UI can format `"Failed to upload {name}: {err}"` directly.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network-level failure (connection refused, timeout, broken body).
    #[error("{0}")]
    Transport(String),

    /// The body was not the JSON shape we expected.
    #[error("Unexpected server response: {0}")]
    MalformedResponse(String),

    /// The server answered `success: false`.
    #[error("{message}")]
    Rejected { message: String },
}

impl UploadError {
    /// Build a `Rejected` error, falling back to the generic text when the server sent none.
    pub fn rejected(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Upload failed".to_string());
        UploadError::Rejected { message }
    }
}
