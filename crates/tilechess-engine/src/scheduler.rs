//! Background job scheduler.
//!
//! A fixed pool of worker threads shares a single-slot mailbox behind a
//! `Mutex` and `Condvar`. Submitting a job while another is still waiting
//! replaces the waiting one, so only the most recent request is ever run.
//! Jobs that already started always run to completion; there is no
//! cancellation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    pending: Option<Job>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    wakeup: Condvar,
}

impl Shared {
    /// Locks the mailbox. A panic while holding the lock cannot leave the
    /// state half-written, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Number of workers for a pool that leaves `reserve` cores to the caller.
/// Always at least one.
pub fn worker_count(reserve: usize) -> usize {
    num_cpus::get().saturating_sub(reserve).max(1)
}

/// A pool of worker threads fed through a single-slot mailbox.
pub struct JobScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    threads: usize,
}

impl JobScheduler {
    /// Starts `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let mut scheduler = JobScheduler {
            shared: Arc::new(Shared::default()),
            workers: Vec::new(),
            threads: threads.max(1),
        };
        scheduler.spawn_workers();
        scheduler
    }

    /// Starts one worker per core, keeping `reserve` cores free.
    pub fn with_reserve(reserve: usize) -> Self {
        Self::new(worker_count(reserve))
    }

    fn spawn_workers(&mut self) {
        self.workers = (0..self.threads)
            .map(|id| {
                let shared = Arc::clone(&self.shared);
                thread::Builder::new()
                    .name(format!("tilechess-worker-{id}"))
                    .spawn(move || worker_loop(id, &shared))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!(error = %e, "failed to spawn worker thread");
                    None
                }
            })
            .collect();
        tracing::info!(workers = self.workers.len(), "job scheduler started");
    }

    /// Number of running workers.
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Restarts the pool after [`shutdown`](Self::shutdown). Does nothing if
    /// it is already running.
    pub fn init(&mut self) {
        if self.is_running() {
            return;
        }
        self.shared = Arc::new(Shared::default());
        self.spawn_workers();
    }

    /// Queues `job`, replacing any job still waiting in the mailbox. Returns
    /// true if a waiting job was replaced. Jobs submitted to a stopped pool
    /// are dropped.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.is_running() {
            tracing::warn!("job submitted to a stopped scheduler was dropped");
            return false;
        }
        let replaced = {
            let mut state = self.shared.lock();
            state.pending.replace(Box::new(job)).is_some()
        };
        if replaced {
            tracing::debug!("pending job replaced by a newer submission");
        } else {
            tracing::debug!("job submitted");
        }
        self.shared.wakeup.notify_one();
        replaced
    }

    /// Queues `work` and runs `notify` with its result on the same worker.
    pub fn submit_with_notify<T, W, N>(&self, work: W, notify: N) -> bool
    where
        W: FnOnce() -> T + Send + 'static,
        N: FnOnce(T) + Send + 'static,
    {
        self.submit(move || notify(work()))
    }

    /// Stops the workers and waits for them. A job that is running finishes
    /// first; a job still waiting is dropped.
    pub fn shutdown(&mut self) {
        if !self.is_running() {
            return;
        }
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.pending = None;
        }
        self.shared.wakeup.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked outside a job");
            }
        }
        tracing::info!("job scheduler stopped");
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("threads", &self.threads())
            .finish_non_exhaustive()
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    return;
                }
                if let Some(job) = state.pending.take() {
                    break job;
                }
                state = shared
                    .wakeup
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(worker = id, "job panicked");
        }
    }
}
