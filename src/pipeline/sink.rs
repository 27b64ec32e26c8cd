//! Progress reporting from the engine to its host

use crate::models::JobStage;

/// Receives log lines and stage changes while a job runs.
///
/// Any `Fn(&str) + Send + Sync` closure is a sink that only cares about
/// log lines.
pub trait ProgressSink: Send + Sync {
    fn log(&self, message: &str);

    fn stage(&self, _stage: JobStage) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Discards everything; `tracing` still sees the milestones
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn log(&self, _message: &str) {}
}
