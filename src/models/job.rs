//! Per-run conversion state

use std::fmt;
use std::path::{Path, PathBuf};

/// One conversion run. Lives only as long as [`crate::ConverterEngine::process`].
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub work_dir: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub shim_filename: Option<String>,
    pub destination: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(source: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            work_dir: work_dir.into(),
            manifest_path: None,
            shim_filename: None,
            destination: None,
        }
    }

    /// Directory holding the located manifest; becomes the archive root
    pub fn package_root(&self) -> Option<&Path> {
        self.manifest_path.as_deref().and_then(Path::parent)
    }

    /// Default output name: input base name plus `suffix`
    pub fn default_output_name(&self, suffix: &str) -> String {
        let stem = if self.source.is_dir() {
            self.source.file_name()
        } else {
            self.source.file_stem()
        };
        let stem = stem
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "extension".to_string());
        format!("{}{}", stem, suffix)
    }
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Idle,
    Extracting,
    ShimFetch,
    Transforming,
    Repackaging,
    Done,
    Cancelled,
    Failed,
}

impl JobStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStage::Done | JobStage::Cancelled | JobStage::Failed)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStage::Idle => "Idle",
            JobStage::Extracting => "Extracting package",
            JobStage::ShimFetch => "Downloading polyfill",
            JobStage::Transforming => "Patching manifest",
            JobStage::Repackaging => "Building .xpi",
            JobStage::Done => "Done",
            JobStage::Cancelled => "Cancelled",
            JobStage::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Successful end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Completed(PathBuf),
    /// The caller declined to pick a destination; nothing was written
    Cancelled,
}
