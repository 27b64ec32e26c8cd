//! Chrome to Firefox Extension Converter
//!
//! Repackages a Chrome MV3 extension (directory, `.zip` or `.crx`) as a
//! Firefox `.xpi`: the manifest is rewritten by a fixed sequence of rules and
//! the webextension polyfill is downloaded and injected.

pub mod config;
pub mod disclaimer;
pub mod error;
pub mod models;
pub mod packager;
pub mod parser;
pub mod pipeline;
pub mod runner;
pub mod shim;
pub mod transformer;
#[cfg(feature = "cli")]
pub mod cli;

pub use config::{ConverterConfig, ShimConfig};
pub use error::{ConvertError, Result};
pub use models::{ConversionJob, ConversionOutcome, JobStage, ManifestDocument};
pub use pipeline::{ConverterEngine, NullSink, ProgressSink};
pub use runner::{JobEvent, JobHandle, JobRunner, JobStatus};
pub use transformer::{gecko_id, transform, ManifestTransformer, Rule};

use std::path::{Path, PathBuf};

/// Convert `input` into `output` with the given configuration, logging to `sink`.
///
/// Convenience wrapper for callers that already know the destination.
pub fn convert_extension(
    input: &Path,
    output: &Path,
    config: ConverterConfig,
    sink: impl ProgressSink + 'static,
) -> Result<ConversionOutcome> {
    let engine = ConverterEngine::new(config, sink);
    engine.process(input, |_| Some(PathBuf::from(output)))
}
