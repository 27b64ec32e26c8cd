//! One-time legal disclaimer, remembered by a marker file

use crate::error::{ConvertError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DISCLAIMER_FILE: &str = ".disclaimer_accepted";

const MARKER_CONTENT: &str = "User accepted disclaimer";

pub const DISCLAIMER_TEXT: &str = "\
LEGAL NOTICE

This tool is intended ONLY for:
  - Converting YOUR OWN extensions
  - Converting open-source extensions (MIT, GPL, etc.)
  - Educational and research purposes

NOT for:
  - Converting proprietary extensions without permission
  - Redistributing converted extensions
  - Violating Chrome Web Store Terms of Service

You are solely responsible for ensuring you have the legal right
to convert and use any extension.

The developer assumes NO LIABILITY for misuse.";

/// Presence of the marker means accepted. No expiry, no versioning.
#[derive(Debug, Clone)]
pub struct DisclaimerGate {
    marker: PathBuf,
}

impl DisclaimerGate {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Marker in the given directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DISCLAIMER_FILE))
    }

    pub fn is_accepted(&self) -> bool {
        self.marker.exists()
    }

    pub fn accept(&self) -> Result<()> {
        fs::write(&self.marker, MARKER_CONTENT).map_err(|source| ConvertError::Write {
            path: self.marker.clone(),
            source,
        })
    }
}

impl Default for DisclaimerGate {
    fn default() -> Self {
        Self::new(DISCLAIMER_FILE)
    }
}
