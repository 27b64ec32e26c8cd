//! Conversion pipeline: extract, fetch the polyfill, patch the manifest, repackage
//!
//! One call to [`ConverterEngine::process`] walks
//! `Extracting -> ShimFetch -> Transforming -> Repackaging -> Done`, ending in
//! `Cancelled` when the caller declines a destination or `Failed` on any
//! error. Nothing is retried. The working area is a temporary directory that
//! is removed on every exit path.

pub mod sink;

pub use sink::{NullSink, ProgressSink};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::models::{ConversionJob, ConversionOutcome, JobStage};
use crate::packager::{self, create_xpi, locate_manifest};
use crate::parser::{parse_manifest_from_file, write_manifest};
use crate::shim::{HttpShimFetcher, ShimFetcher};
use crate::transformer::ManifestTransformer;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info, warn};

const WORK_DIR_PREFIX: &str = "chrome2moz-";

pub struct ConverterEngine {
    config: ConverterConfig,
    fetcher: Option<Box<dyn ShimFetcher>>,
    sink: Box<dyn ProgressSink>,
}

impl ConverterEngine {
    /// Build an engine that downloads the shim over HTTP when `config.shim` is set
    pub fn new(config: ConverterConfig, sink: impl ProgressSink + 'static) -> Self {
        let fetcher = config
            .shim
            .clone()
            .map(|shim| Box::new(HttpShimFetcher::new(shim)) as Box<dyn ShimFetcher>);

        Self {
            config,
            fetcher,
            sink: Box::new(sink),
        }
    }

    /// Replace the shim source, e.g. with a local file in tests
    pub fn with_fetcher(mut self, fetcher: impl ShimFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Convert `input` and write the `.xpi` wherever `resolve_destination` says.
    ///
    /// `resolve_destination` receives the default file name and may return
    /// `None` to cancel; that ends the run with [`ConversionOutcome::Cancelled`].
    /// Errors (and panics, reported as [`ConvertError::Internal`]) are logged
    /// to the sink before being returned.
    pub fn process<R>(&self, input: &Path, resolve_destination: R) -> Result<ConversionOutcome>
    where
        R: FnOnce(&str) -> Option<PathBuf>,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(input, resolve_destination)))
            .unwrap_or_else(|payload| Err(ConvertError::Internal(panic_message(payload.as_ref()))));

        if let Err(err) = &result {
            self.report_failure(err);
        }
        result
    }

    fn run<R>(&self, input: &Path, resolve_destination: R) -> Result<ConversionOutcome>
    where
        R: FnOnce(&str) -> Option<PathBuf>,
    {
        if !self.config.disclaimer_accepted {
            return Err(ConvertError::DisclaimerNotAccepted);
        }

        let work_area = self.create_work_area()?;
        let mut job = ConversionJob::new(input, work_area.path());

        self.set_stage(JobStage::Extracting);
        self.log("Extracting package...");
        let kind = packager::unpack(&job.source, &job.work_dir)?;
        info!("Unpacked {} as {:?}", job.source.display(), kind);

        let manifest_path = locate_manifest(&job.work_dir)?;
        let package_root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| job.work_dir.clone());
        job.manifest_path = Some(manifest_path);

        if let Some(fetcher) = &self.fetcher {
            self.set_stage(JobStage::ShimFetch);
            self.log("Downloading polyfill library...");
            job.shim_filename = Some(fetcher.fetch(&package_root)?);
        }

        self.set_stage(JobStage::Transforming);
        self.patch_manifest(&job)?;

        self.set_stage(JobStage::Repackaging);
        let default_name = job.default_output_name(&self.config.output_suffix);
        let Some(destination) = resolve_destination(&default_name) else {
            self.log("Save operation cancelled.");
            self.set_stage(JobStage::Cancelled);
            return Ok(ConversionOutcome::Cancelled);
        };

        self.log(&format!("Saving to: {}", display_file_name(&destination)));
        let entries = create_xpi(&package_root, &destination)?;
        info!("Wrote {} entries to {}", entries, destination.display());
        job.destination = Some(destination.clone());

        if let Err(e) = work_area.close() {
            warn!("Failed to remove working directory: {}", e);
        }

        self.log("Conversion completed successfully.");
        self.set_stage(JobStage::Done);
        Ok(ConversionOutcome::Completed(destination))
    }

    fn patch_manifest(&self, job: &ConversionJob) -> Result<()> {
        let manifest_path = job
            .manifest_path
            .as_deref()
            .ok_or_else(|| ConvertError::ManifestMissing(job.work_dir.clone()))?;

        self.log(&format!("Processing manifest: {}", display_relative(manifest_path, &job.work_dir)));
        let mut manifest = parse_manifest_from_file(manifest_path)?;

        let transformer = ManifestTransformer::new(job.shim_filename.as_deref())
            .with_strict_min_version(self.config.strict_min_version.clone());
        let report = transformer.transform_in_place(&mut manifest);
        if report.is_empty() {
            self.log("Manifest already Firefox-compatible, no changes needed.");
        }
        for change in &report.changes {
            info!(rule = %change.rule, "{}", change.description);
            self.sink.log(&change.description);
        }

        write_manifest(&manifest, manifest_path)
    }

    fn create_work_area(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORK_DIR_PREFIX);
        match &self.config.work_root {
            Some(root) => builder.tempdir_in(root).map_err(|e| ConvertError::io(root, e)),
            None => builder
                .tempdir()
                .map_err(|e| ConvertError::io(std::env::temp_dir(), e)),
        }
    }

    fn report_failure(&self, err: &ConvertError) {
        if let ConvertError::ShimFetch(_) = err {
            let message = "CRITICAL: Check your internet connection. \
                           The polyfill could not be downloaded, so the conversion was stopped.";
            error!("{}", message);
            self.sink.log(message);
        }
        error!("Conversion failed: {}", err);
        self.sink.log(&format!("Error: {}", err));
        self.set_stage(JobStage::Failed);
    }

    fn log(&self, message: &str) {
        info!("{}", message);
        self.sink.log(message);
    }

    fn set_stage(&self, stage: JobStage) {
        self.sink.stage(stage);
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
