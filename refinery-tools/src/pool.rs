//! Fixed-size worker pool for independent aligner jobs

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use refinery_core::RefineryError;
use refinery_utils::{create_progress_bar, resolve_workers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Runs a batch of jobs on its own rayon pool.
///
/// The pool is private to the batch, so the global rayon pool stays free for
/// other work.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
    show_progress: bool,
}

/// Build a pool of `workers` threads; 0 uses every available core
pub fn build_worker_pool(workers: usize) -> Result<WorkerPool> {
    let workers = resolve_workers(workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("refinery-worker-{}", i))
        .build()
        .context("Failed to build aligner worker pool")?;
    debug!("Aligner worker pool with {} workers", workers);
    Ok(WorkerPool {
        pool,
        workers,
        show_progress: false,
    })
}

impl WorkerPool {
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run every job and return the results in job order.
    ///
    /// The first failing job aborts the batch: jobs that have not started yet
    /// are skipped and that job's error is returned.
    pub fn run<J, T, F>(&self, label: &str, jobs: &[J], job_fn: F) -> Result<Vec<T>>
    where
        J: Sync,
        T: Send,
        F: Fn(&J) -> Result<T> + Sync,
    {
        let progress = if self.show_progress {
            create_progress_bar(jobs.len() as u64, label)
        } else {
            ProgressBar::hidden()
        };
        let failed = AtomicBool::new(false);
        let first_error: Mutex<Option<anyhow::Error>> = Mutex::new(None);

        let results: Vec<Option<T>> = self.pool.install(|| {
            jobs.par_iter()
                .enumerate()
                .map(|(index, job)| {
                    if failed.load(Ordering::SeqCst) {
                        return None;
                    }
                    match job_fn(job) {
                        Ok(value) => {
                            progress.inc(1);
                            Some(value)
                        }
                        Err(e) => {
                            failed.store(true, Ordering::SeqCst);
                            let mut slot = first_error.lock().unwrap_or_else(|p| p.into_inner());
                            if slot.is_none() {
                                *slot = Some(e.context(format!("{} job {} failed", label, index + 1)));
                            }
                            None
                        }
                    }
                })
                .collect()
        });
        progress.finish_and_clear();

        if let Some(error) = first_error.into_inner().unwrap_or_else(|p| p.into_inner()) {
            warn!("{} aborted: {:#}", label, error);
            return Err(error);
        }

        let total = results.len();
        let done: Vec<T> = results.into_iter().flatten().collect();
        if done.len() != total {
            return Err(RefineryError::Cancelled.into());
        }
        Ok(done)
    }
}
