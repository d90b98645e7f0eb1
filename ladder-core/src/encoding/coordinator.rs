//! Bounded parallel execution of rendition jobs.
//!
//! Jobs run on a dedicated rayon pool sized to the configured worker count.
//! A failing or panicking job is recorded and the rest keep going; results
//! are collected in completion order.

use crate::error::{CoreError, CoreResult};
use crate::rendition::RenditionJob;

use log::{debug, error, info};
use serde::Serialize;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

/// Called after every finished job with `(completed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// A job that did not produce a rendition.
#[derive(Debug, Clone, Serialize)]
pub struct RenditionFailure {
    pub job: RenditionJob,
    pub error: String,
}

/// What a batch produced.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    /// Rendition paths in completion order
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<RenditionFailure>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs rendition jobs on a bounded worker pool
pub struct JobCoordinator {
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl JobCoordinator {
    /// Create a coordinator running at most `workers` jobs at once
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            on_progress: None,
        }
    }

    /// Set progress callback function
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `work` for every job and waits for all of them.
    ///
    /// Only pool construction can fail the batch as a whole. Individual job
    /// errors and panics end up in [`BatchOutcome::failures`].
    pub fn run<F>(&self, jobs: &[RenditionJob], work: F) -> CoreResult<BatchOutcome>
    where
        F: Fn(&RenditionJob) -> CoreResult<PathBuf> + Sync,
    {
        let mut outcome = BatchOutcome::default();
        if jobs.is_empty() {
            return Ok(outcome);
        }

        let workers = self.workers.min(jobs.len());
        info!("Running {} rendition jobs on {} workers", jobs.len(), workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ladder-worker-{i}"))
            .build()
            .map_err(|e| {
                CoreError::OperationFailed(format!("Failed to initialize thread pool: {e}"))
            })?;

        let (tx, rx) = mpsc::channel::<(RenditionJob, CoreResult<PathBuf>)>();
        let work = &work;
        let pool = &pool;
        let total = jobs.len();

        // The pool is driven from a helper thread so results can be drained
        // here while jobs are still running.
        std::thread::scope(|threads| {
            threads.spawn(move || {
                pool.scope(|scope| {
                    for job in jobs {
                        let tx = tx.clone();
                        scope.spawn(move |_| {
                            debug!("Worker picked up {job}");
                            let result = panic::catch_unwind(AssertUnwindSafe(|| work(job)))
                                .unwrap_or_else(|payload| {
                                    Err(CoreError::JobPanicked(panic_message(payload.as_ref())))
                                });
                            // The receiver outlives the pool scope.
                            let _ = tx.send((*job, result));
                        });
                    }
                });
            });

            for (completed, (job, result)) in rx.iter().enumerate() {
                match result {
                    Ok(path) => {
                        info!("Rendition {job} finished: {}", path.display());
                        outcome.outputs.push(path);
                    }
                    Err(e) => {
                        error!("Rendition {job} failed: {e}");
                        outcome.failures.push(RenditionFailure {
                            job,
                            error: e.to_string(),
                        });
                    }
                }
                if let Some(ref cb) = self.on_progress {
                    cb(completed + 1, total);
                }
            }
        });

        info!(
            "{} of {} renditions succeeded",
            outcome.outputs.len(),
            total
        );
        Ok(outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
