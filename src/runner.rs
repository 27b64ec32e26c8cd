//! Runs one conversion at a time off the interface thread
//!
//! The worker never touches interface state. It only sends [`JobEvent`]s;
//! the only thing the interface sends back is the answer to a destination
//! request.

use crate::error::ConvertError;
use crate::models::{ConversionOutcome, JobStage};
use crate::pipeline::{panic_message, ConverterEngine, ProgressSink};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

/// Messages from the worker to the interface
#[derive(Debug)]
pub enum JobEvent {
    Stage(JobStage),
    Log(String),
    /// Answer with `Some(path)` to save, `None` (or drop `reply`) to cancel
    DestinationRequested {
        default_name: String,
        reply: oneshot::Sender<Option<PathBuf>>,
    },
    /// Always the last event of a job
    Finished(JobStatus),
}

#[derive(Debug)]
pub enum JobStatus {
    Completed(PathBuf),
    Cancelled,
    Failed(ConvertError),
}

impl From<Result<ConversionOutcome, ConvertError>> for JobStatus {
    fn from(result: Result<ConversionOutcome, ConvertError>) -> Self {
        match result {
            Ok(ConversionOutcome::Completed(path)) => JobStatus::Completed(path),
            Ok(ConversionOutcome::Cancelled) => JobStatus::Cancelled,
            Err(err) => JobStatus::Failed(err),
        }
    }
}

/// Receiving end of a running job
pub struct JobHandle {
    events: mpsc::UnboundedReceiver<JobEvent>,
}

impl JobHandle {
    /// Next event, `None` once the job has finished and the channel closed
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }
}

/// Owns the engine and makes sure at most one job is in flight
pub struct JobRunner {
    factory: Arc<EngineFactory>,
    busy: Arc<AtomicBool>,
}

// The engine's sink is fixed at construction, so each job builds a fresh
// engine around its own channel.
type EngineFactory = dyn Fn(ChannelSink) -> ConverterEngine + Send + Sync;

impl JobRunner {
    /// `factory` builds the engine for each job around the sink it is given
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(ChannelSink) -> ConverterEngine + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start converting `input` on a blocking worker thread.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`ConvertError::Busy`] while another job is running.
    pub fn start(&self, input: impl Into<PathBuf>) -> Result<JobHandle, ConvertError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConvertError::Busy);
        }

        let input = input.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelSink { tx: tx.clone() };
        let factory = Arc::clone(&self.factory);
        let busy = BusyGuard(Arc::clone(&self.busy));
        let request_tx = tx.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let engine = factory(sink);
            engine.process(&input, |default_name| {
                request_destination(&request_tx, default_name)
            })
        });

        tokio::spawn(async move {
            let status = match worker.await {
                Ok(result) => JobStatus::from(result),
                Err(join_err) => {
                    let message = match join_err.try_into_panic() {
                        Ok(payload) => panic_message(payload.as_ref()),
                        Err(err) => err.to_string(),
                    };
                    error!("Conversion worker crashed: {}", message);
                    JobStatus::Failed(ConvertError::Internal(message))
                }
            };
            // Release before announcing, so a new job can start on receipt
            drop(busy);
            let _ = tx.send(JobEvent::Finished(status));
        });

        Ok(JobHandle { events: rx })
    }
}

fn request_destination(
    tx: &mpsc::UnboundedSender<JobEvent>,
    default_name: &str,
) -> Option<PathBuf> {
    let (reply, answer) = oneshot::channel();
    let event = JobEvent::DestinationRequested {
        default_name: default_name.to_string(),
        reply,
    };
    if tx.send(event).is_err() {
        debug!("Interface gone, treating destination request as cancelled");
        return None;
    }
    answer.blocking_recv().ok().flatten()
}

/// Forwards engine output into the job's event channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl ProgressSink for ChannelSink {
    fn log(&self, message: &str) {
        let _ = self.tx.send(JobEvent::Log(message.to_string()));
    }

    fn stage(&self, stage: JobStage) {
        let _ = self.tx.send(JobEvent::Stage(stage));
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
