//! Supervised worker pool that executes accepted runs.
//!
//! Runs are handed to the pool through a bounded queue. Each worker takes one
//! job at a time and executes it in a task of its own, so a panicking run is
//! observed through its `JoinHandle` instead of taking the worker down.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::job::QueuedRun;
use super::runner::BackgroundRunner;
use crate::config::WorkerConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::Backend;

/// Sending side of the run queue, shared by coordinators.
#[derive(Debug, Clone)]
pub struct RunQueue {
    sender: mpsc::Sender<QueuedRun>,
    capacity: usize,
}

impl RunQueue {
    /// Claims a queue slot without waiting.
    pub(crate) fn reserve(&self) -> EngineResult<mpsc::Permit<'_, QueuedRun>> {
        self.sender.try_reserve().map_err(|error| match error {
            TrySendError::Full(()) => EngineError::QueueFull {
                capacity: self.capacity,
            },
            TrySendError::Closed(()) => EngineError::WorkerPoolClosed,
        })
    }

    /// Maximum number of runs waiting for a worker.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the pool has stopped taking runs.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A fixed set of workers consuming the run queue.
#[derive(Debug)]
pub struct RunWorkerPool {
    queue: RunQueue,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl RunWorkerPool {
    /// Spawns `config.count` workers on the current runtime.
    pub fn start<B: Backend>(runner: Arc<BackgroundRunner<B>>, config: WorkerConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let (shutdown, _) = watch::channel(false);

        let workers = (0..config.count.max(1))
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    runner.clone(),
                    receiver.clone(),
                    shutdown.subscribe(),
                ))
            })
            .collect::<Vec<_>>();

        info!(
            workers = workers.len(),
            queue_capacity = capacity,
            "run worker pool started"
        );

        Self {
            queue: RunQueue { sender, capacity },
            shutdown,
            workers,
        }
    }

    /// A handle for submitting runs.
    pub fn queue(&self) -> RunQueue {
        self.queue.clone()
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops intake, finishes every accepted run and joins the workers.
    pub async fn shutdown(self) {
        info!("run worker pool shutting down");
        self.shutdown.send_replace(true);
        for worker in self.workers {
            if let Err(join_error) = worker.await {
                error!(error = %join_error, "run worker terminated abnormally");
            }
        }
        info!("run worker pool stopped");
    }
}

async fn worker_loop<B: Backend>(
    worker_id: usize,
    runner: Arc<BackgroundRunner<B>>,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedRun>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(worker_id, "run worker started");
    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            if *shutdown.borrow() {
                receiver.close();
            }
            tokio::select! {
                queued = receiver.recv() => queued,
                _ = shutdown.changed() => {
                    // Closing keeps already-queued runs receivable.
                    receiver.close();
                    receiver.recv().await
                }
            }
        };
        let Some(queued) = next else {
            break;
        };
        run_queued(worker_id, &runner, queued).await;
    }
    debug!(worker_id, "run worker stopped");
}

async fn run_queued<B: Backend>(
    worker_id: usize,
    runner: &Arc<BackgroundRunner<B>>,
    queued: QueuedRun,
) {
    let QueuedRun { job, completion } = queued;
    let job_id = job.job_id.clone();
    let period_id = job.period_id;
    info!(worker_id, job_id = %job_id, period_id, "picked up payroll job");

    let task = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.execute(job).await })
    };

    let outcome = match task.await {
        Ok(report) => Ok(report),
        Err(join_error) => {
            let message = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            error!(worker_id, job_id = %job_id, period_id, error = %message, "payroll job crashed");
            runner.mark_failed(period_id).await;
            Err(EngineError::JobCrashed { job_id, message })
        }
    };

    if completion.send(outcome).is_err() {
        debug!(worker_id, period_id, "run handle dropped before completion");
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "job panicked".to_string()
    }
}
