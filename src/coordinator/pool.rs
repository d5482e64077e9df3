//! Fixed-size worker pool backed by a tokio multi-thread runtime

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Owns the runtime that executes precompute units and formation tasks
pub struct WorkerPool {
    runtime: Runtime,
    worker_threads: usize,
    shutdown_grace: Duration,
}

impl WorkerPool {
    /// Build a pool with exactly `worker_threads` threads (at least one)
    pub fn new(worker_threads: usize, shutdown_grace: Duration) -> Result<Self> {
        let worker_threads = worker_threads.max(1);

        let runtime = Builder::new_multi_thread()
            .enable_time()
            .worker_threads(worker_threads)
            .thread_name("fitmatch-worker")
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create worker pool: {}", e)))?;

        debug!(worker_threads, "Worker pool started");

        Ok(Self {
            runtime,
            worker_threads,
            shutdown_grace,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Drive a future to completion on the pool. Must not be called from
    /// inside another tokio runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Drain outstanding work for up to the grace period, then drop it
    pub fn shutdown(self) {
        info!(
            grace_secs = self.shutdown_grace.as_secs_f64(),
            "Shutting down worker pool"
        );
        self.runtime.shutdown_timeout(self.shutdown_grace);
    }
}
