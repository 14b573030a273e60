//! Background generation jobs.
//!
//! A batch generation can take a while on large cohorts, so the runner
//! moves it onto tokio's blocking pool and reports progress as
//! [`JobEvent`]s on an mpsc channel. The scheduler itself knows nothing
//! about jobs.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, SchedulingError};
use crate::scheduler::{GenerateRequest, GenerationSummary, Unassigned};
use crate::service::SchedulingService;
use crate::store::ScheduleStore;

/// Capacity of the event channel.
const EVENT_BUFFER: usize = 100;

/// Identifier of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Event sent from running jobs.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Job picked up.
    Started { job_id: JobId },
    /// Generation finished and its sessions are committed.
    Completed {
        job_id: JobId,
        summary: GenerationSummary,
        unassigned: Vec<Unassigned>,
    },
    /// Generation failed.
    Failed { job_id: JobId, error: String },
    /// Job aborted by [`GenerationRunner::cancel`].
    Cancelled { job_id: JobId },
}

impl JobEvent {
    /// Job the event belongs to.
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Started { job_id }
            | JobEvent::Completed { job_id, .. }
            | JobEvent::Failed { job_id, .. }
            | JobEvent::Cancelled { job_id } => *job_id,
        }
    }
}

/// Runs batch generations off the caller's task.
pub struct GenerationRunner<S: ScheduleStore + 'static> {
    service: Arc<SchedulingService<S>>,
    event_tx: mpsc::Sender<JobEvent>,
    jobs: Mutex<HashMap<JobId, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl<S: ScheduleStore + 'static> GenerationRunner<S> {
    /// Create a runner and the receiving end of its event channel.
    pub fn new(service: Arc<SchedulingService<S>>) -> (Self, mpsc::Receiver<JobEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let runner = Self {
            service,
            event_tx,
            jobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        };
        (runner, event_rx)
    }

    /// The service jobs run against.
    pub fn service(&self) -> &Arc<SchedulingService<S>> {
        &self.service
    }

    /// Submit a generation. Returns immediately with the job id.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: GenerateRequest) -> Result<JobId> {
        let job_id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let service = Arc::clone(&self.service);
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let _ = tx.send(JobEvent::Started { job_id }).await;
            tracing::info!(%job_id, projects = request.projects.len(), "Generation job started");

            let result = tokio::task::spawn_blocking(move || service.generate(request)).await;
            let event = match result {
                Ok(Ok(outcome)) => {
                    tracing::info!(
                        %job_id,
                        scheduled = outcome.summary.scheduled,
                        unscheduled = outcome.summary.unscheduled,
                        "Generation job completed"
                    );
                    JobEvent::Completed {
                        job_id,
                        summary: outcome.summary,
                        unassigned: outcome.unassigned,
                    }
                }
                Ok(Err(err)) => {
                    tracing::error!(%job_id, error = %err, "Generation job failed");
                    JobEvent::Failed {
                        job_id,
                        error: err.to_string(),
                    }
                }
                Err(err) => {
                    tracing::error!(%job_id, error = %err, "Generation job panicked");
                    JobEvent::Failed {
                        job_id,
                        error: err.to_string(),
                    }
                }
            };
            let _ = tx.send(event).await;
        });

        let mut jobs = self.lock_jobs()?;
        jobs.retain(|_, h| !h.is_finished());
        jobs.insert(job_id, handle);
        Ok(job_id)
    }

    /// Abort a running job. Returns `false` if it is unknown or already done.
    ///
    /// A run already on the blocking pool cannot be interrupted: it
    /// finishes, sessions it committed stay booked, and its outcome is
    /// dropped in favor of a `Cancelled` event.
    pub fn cancel(&self, job_id: JobId) -> Result<bool> {
        let Some(handle) = self.lock_jobs()?.remove(&job_id) else {
            return Ok(false);
        };
        if handle.is_finished() {
            return Ok(false);
        }

        handle.abort();
        tracing::warn!(%job_id, "Generation job cancelled");
        if let Err(err) = self.event_tx.try_send(JobEvent::Cancelled { job_id }) {
            tracing::warn!(%job_id, error = %err, "Failed to report cancellation");
        }
        Ok(true)
    }

    /// Whether a job is still running.
    pub fn is_running(&self, job_id: JobId) -> Result<bool> {
        Ok(self
            .lock_jobs()?
            .get(&job_id)
            .is_some_and(|h| !h.is_finished()))
    }

    /// Number of jobs still running.
    pub fn running_count(&self) -> Result<usize> {
        Ok(self
            .lock_jobs()?
            .values()
            .filter(|h| !h.is_finished())
            .count())
    }

    fn lock_jobs(&self) -> Result<std::sync::MutexGuard<'_, HashMap<JobId, JoinHandle<()>>>> {
        self.jobs
            .lock()
            .map_err(|e| SchedulingError::LockPoisoned(e.to_string()))
    }
}
