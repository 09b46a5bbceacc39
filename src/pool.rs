//! A fixed-size worker pool with shareable futures.
//!
//! This is a generalization of the job-queue-plus-promise pattern used
//! elsewhere for dispatching parallel work to a thread pool: a `Mutex` +
//! `Condvar`-guarded queue feeds a fixed set of worker threads, and each
//! submission hands back a handle that can be awaited later, possibly by
//! more than one reader. The one addition over a plain one-shot promise is
//! that [`CheckFuture`] is cheaply `Clone`-able and exposes a non-blocking
//! readiness probe, because the Check Cache hands the *same* future out to
//! every concurrent observer of a fingerprint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::OracleError;
use crate::oracle::CheckOutcome;

type CheckResult = Result<CheckOutcome, OracleError>;

struct Slot {
    value: Mutex<Option<CheckResult>>,
    ready_cv: Condvar,
}

/// A handle to an oracle computation that is pending or has resolved.
///
/// `await_result` blocks until the value is available; `poll_ready` never
/// blocks and reports whether the value was already available at the moment
/// it was called (used to count "ready" cache hits for instrumentation).
#[derive(Clone)]
pub struct CheckFuture {
    slot: Arc<Slot>,
}

impl CheckFuture {
    fn new() -> (Self, CheckFutureResolver) {
        let slot = Arc::new(Slot {
            value: Mutex::new(None),
            ready_cv: Condvar::new(),
        });
        (
            CheckFuture { slot: slot.clone() },
            CheckFutureResolver { slot },
        )
    }

    /// A value already known at construction time, wrapped as a resolved
    /// future. Useful for tests and for the sequential core, which has no
    /// pool to submit to.
    pub fn ready(result: CheckResult) -> Self {
        let (future, resolver) = CheckFuture::new();
        resolver.resolve(result);
        future
    }

    /// True if the value is already available, without blocking.
    pub fn poll_ready(&self) -> bool {
        self.slot.value.lock().unwrap().is_some()
    }

    /// Blocks until the value is available and returns it.
    pub fn await_result(&self) -> CheckResult {
        let mut guard = self.slot.value.lock().unwrap();
        while guard.is_none() {
            guard = self.slot.ready_cv.wait(guard).unwrap();
        }
        guard.clone().unwrap()
    }
}

struct CheckFutureResolver {
    slot: Arc<Slot>,
}

impl CheckFutureResolver {
    fn resolve(self, result: CheckResult) {
        let mut guard = self.slot.value.lock().unwrap();
        *guard = Some(result);
        self.slot.ready_cv.notify_all();
    }
}

type Job = Box<dyn FnOnce() + Send>;

/// A fixed-size thread pool dedicated to running oracle calls concurrently.
pub struct WorkerPool {
    queue: Arc<Mutex<VecDeque<Job>>>,
    work_cv: Arc<Condvar>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `concurrency` worker threads. `concurrency` is clamped to at
    /// least 1.
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        let queue: Arc<Mutex<VecDeque<Job>>> = Arc::new(Mutex::new(VecDeque::new()));
        let work_cv = Arc::new(Condvar::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..concurrency)
            .map(|_| {
                let queue = queue.clone();
                let work_cv = work_cv.clone();
                let shutdown = shutdown.clone();
                thread::spawn(move || loop {
                    let job = {
                        let mut guard = queue.lock().unwrap();
                        loop {
                            if let Some(job) = guard.pop_front() {
                                break Some(job);
                            }
                            if shutdown.load(Ordering::Acquire) {
                                break None;
                            }
                            guard = work_cv.wait(guard).unwrap();
                        }
                    };
                    match job {
                        Some(job) => job(),
                        None => break,
                    }
                })
            })
            .collect();

        WorkerPool {
            queue,
            work_cv,
            shutdown,
            workers,
        }
    }

    /// Queues `job` to run on the pool and returns a future for its result.
    /// If the pool has already been shut down, the job is not queued and the
    /// returned future never resolves from pool activity — callers should
    /// not submit after `shutdown`.
    pub fn submit<F>(&self, job: F) -> CheckFuture
    where
        F: FnOnce() -> CheckResult + Send + 'static,
    {
        let (future, resolver) = CheckFuture::new();
        if self.shutdown.load(Ordering::Acquire) {
            return future;
        }
        let mut guard = self.queue.lock().unwrap();
        guard.push_back(Box::new(move || resolver.resolve(job())));
        self.work_cv.notify_one();
        future
    }

    /// Refuses further submissions, drops any queued-but-unstarted jobs, and
    /// joins the worker threads. In-flight jobs are allowed to finish.
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Release);
        self.queue.lock().unwrap().clear();
        self.work_cv.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.queue.lock().unwrap().clear();
            self.work_cv.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
