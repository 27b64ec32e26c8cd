//! Converter configuration

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SHIM_URL: &str =
    "https://unpkg.com/webextension-polyfill/dist/browser-polyfill.min.js";
pub const DEFAULT_SHIM_FILENAME: &str = "browser-polyfill.min.js";
pub const DEFAULT_STRICT_MIN_VERSION: &str = "109.0";
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_firefox.xpi";

/// Settings for one engine instance, passed in at construction
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Parent directory for per-job working areas (system temp dir when unset)
    pub work_root: Option<PathBuf>,
    pub disclaimer_accepted: bool,
    /// `None` skips the polyfill download and its injection
    pub shim: Option<ShimConfig>,
    pub strict_min_version: String,
    pub output_suffix: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            work_root: None,
            disclaimer_accepted: false,
            shim: Some(ShimConfig::default()),
            strict_min_version: DEFAULT_STRICT_MIN_VERSION.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn with_disclaimer_accepted(mut self, accepted: bool) -> Self {
        self.disclaimer_accepted = accepted;
        self
    }

    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    pub fn without_shim(mut self) -> Self {
        self.shim = None;
        self
    }

    /// Name of the shim file rule 5 will reference, if a fetch is configured
    pub fn shim_filename(&self) -> Option<&str> {
        self.shim.as_ref().map(|s| s.filename.as_str())
    }
}

/// Where and how the compatibility polyfill is downloaded
#[derive(Debug, Clone)]
pub struct ShimConfig {
    pub url: String,
    pub filename: String,
    pub timeout: Duration,
    /// Skip TLS certificate verification. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SHIM_URL.to_string(),
            filename: DEFAULT_SHIM_FILENAME.to_string(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}
