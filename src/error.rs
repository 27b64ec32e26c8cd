//! Error types for the conversion pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input is neither a directory nor a readable zip/crx archive
    #[error("Unsupported input format: {path} ({reason})")]
    InputFormat { path: PathBuf, reason: String },

    #[error("manifest.json not found in {0}")]
    ManifestMissing(PathBuf),

    #[error("Manifest file is invalid JSON: {0}")]
    ManifestParse(String),

    /// Network, TLS, timeout, non-success status or failure writing the shim
    #[error("Polyfill download failed: {0}")]
    ShimFetch(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read archive: {0}")]
    Archive(String),

    #[error("The legal disclaimer has not been accepted")]
    DisclaimerNotAccepted,

    #[error("A conversion is already in progress")]
    Busy,

    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short title for the notification shown to the user
    pub fn title(&self) -> &'static str {
        match self {
            ConvertError::ShimFetch(_) => "Connection Error",
            ConvertError::InputFormat { .. } => "Unsupported Input",
            ConvertError::ManifestMissing(_) | ConvertError::ManifestParse(_) => "Manifest Error",
            ConvertError::Write { .. } => "Save Error",
            ConvertError::DisclaimerNotAccepted => "Disclaimer",
            _ => "Error",
        }
    }
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(err: zip::result::ZipError) -> Self {
        ConvertError::Archive(err.to_string())
    }
}

impl From<walkdir::Error> for ConvertError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        match err.into_io_error() {
            Some(source) => ConvertError::Io { path, source },
            None => ConvertError::Internal(format!("filesystem loop at {}", path.display())),
        }
    }
}
