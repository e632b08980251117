//! PoW generation (multi-threaded CPU).
//!
//! The nonce space is cut into one contiguous range per worker. Every worker
//! scans its range upwards on its own OS thread; the first nonce published on
//! the result channel wins and a shared stop flag tells the others to quit.
//! Workers run inside [`std::thread::scope`], so no search outlives the call
//! that started it.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use powork_utils::StatsCounter;
use tracing::{debug, trace};

use crate::difficulty::WorkBuffer;
use crate::{WorkError, WorkNonce};

/// How often a cancellable generation re-checks the caller's flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Hashes computed across all workers and runs.
pub const STAT_HASHES: &str = "hashes";
/// Runs that returned a nonce.
pub const STAT_GENERATED: &str = "generated";
/// Runs stopped by cancellation or timeout.
pub const STAT_ABANDONED: &str = "abandoned";

/// Nonce range scanned by worker `index` out of `workers`.
///
/// Every worker gets `u64::MAX / workers` nonces starting at
/// `index * delta`. Integer division leaves the tail
/// `[workers * delta, u64::MAX]` unassigned, so with a single worker nonce
/// `u64::MAX` is never tried. `workers` below 1 is treated as 1.
///
/// # Panics
///
/// May panic on overflow if `index >= workers`.
pub fn worker_range(index: usize, workers: usize) -> Range<u64> {
    let workers = workers.max(1);
    debug_assert!(index < workers, "worker index {index} out of {workers}");
    let delta = u64::MAX / workers as u64;
    let start = index as u64 * delta;
    start..start + delta
}

/// Generate a nonce meeting `difficulty` for `payload` with `workers` threads.
///
/// `workers` below 1 is clamped to 1. Blocks until a nonce is found.
pub fn generate_work(payload: &[u8], difficulty: u64, workers: isize) -> u64 {
    WorkGenerator::new(workers).generate(payload, difficulty).0
}

/// How the calling thread waits for the first result.
#[derive(Clone, Copy)]
enum Wait<'a> {
    Forever,
    Until(&'a AtomicBool),
    Timeout(Duration),
}

/// Generates proof-of-work by splitting the nonce space across threads.
#[derive(Debug)]
pub struct WorkGenerator {
    workers: usize,
    active: AtomicUsize,
    stats: StatsCounter,
}

impl WorkGenerator {
    /// Create a generator using `workers` threads per run (clamped to ≥ 1).
    pub fn new(workers: isize) -> Self {
        Self {
            workers: workers.max(1) as usize,
            active: AtomicUsize::new(0),
            stats: StatsCounter::new(&[STAT_HASHES, STAT_GENERATED, STAT_ABANDONED]),
        }
    }

    /// One worker per available CPU.
    pub fn with_available_parallelism() -> Self {
        let cpus = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(cpus as isize)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Worker threads currently alive. Always 0 once a generate call returned.
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    /// Generate a work nonce that meets `difficulty`.
    ///
    /// Blocks until some worker finds one. If no assigned nonce qualifies
    /// this never returns; use [`generate_with_timeout`] or
    /// [`generate_cancellable`] to bound the search.
    ///
    /// [`generate_with_timeout`]: Self::generate_with_timeout
    /// [`generate_cancellable`]: Self::generate_cancellable
    pub fn generate(&self, payload: &[u8], difficulty: u64) -> WorkNonce {
        match self.search(payload, difficulty, Wait::Forever) {
            Ok(nonce) => nonce,
            // A sender stays alive for the whole wait, so the channel never disconnects.
            Err(err) => unreachable!("unbounded work generation ended early: {err}"),
        }
    }

    /// Like [`generate`](Self::generate), but gives up once `cancel` is set.
    ///
    /// `cancel` is polled by the waiting thread; workers are stopped and
    /// joined before [`WorkError::Cancelled`] is returned.
    pub fn generate_cancellable(
        &self,
        payload: &[u8],
        difficulty: u64,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError> {
        self.search(payload, difficulty, Wait::Until(cancel))
    }

    /// Like [`generate`](Self::generate), but gives up after `timeout`.
    pub fn generate_with_timeout(
        &self,
        payload: &[u8],
        difficulty: u64,
        timeout: Duration,
    ) -> Result<WorkNonce, WorkError> {
        self.search(payload, difficulty, Wait::Timeout(timeout))
    }

    fn search(
        &self,
        payload: &[u8],
        difficulty: u64,
        wait: Wait<'_>,
    ) -> Result<WorkNonce, WorkError> {
        let workers = self.workers;
        let started = Instant::now();
        debug!(workers, difficulty, payload_len = payload.len(), "starting work generation");

        // One slot per worker: a late winner can always publish without blocking.
        let (tx, rx) = bounded::<(usize, u64)>(workers);
        let stop = AtomicBool::new(false);

        let outcome = thread::scope(|s| {
            for index in 0..workers {
                let results = tx.clone();
                let stop = &stop;
                let range = worker_range(index, workers);
                s.spawn(move || self.scan(index, range, payload, difficulty, stop, results));
            }

            // An unbounded wait keeps its own sender so exhausted workers leave it blocked.
            let _keep_open = matches!(wait, Wait::Forever).then_some(tx);
            let outcome = wait_for_result(&rx, wait, started);
            stop.store(true, Ordering::Relaxed);
            outcome
        });

        let elapsed = started.elapsed();
        match outcome {
            Ok((worker, nonce)) => {
                self.stats.increment(STAT_GENERATED);
                debug!(worker, nonce, ?elapsed, "work found");
                Ok(WorkNonce(nonce))
            }
            Err(err) => {
                if err != WorkError::Exhausted {
                    self.stats.increment(STAT_ABANDONED);
                }
                debug!(%err, ?elapsed, "work generation stopped");
                Err(err)
            }
        }
    }

    fn scan(
        &self,
        index: usize,
        range: Range<u64>,
        payload: &[u8],
        difficulty: u64,
        stop: &AtomicBool,
        results: Sender<(usize, u64)>,
    ) {
        let _live = LiveWorker::enter(&self.active);
        trace!(worker = index, start = range.start, end = range.end, "scanning nonce range");

        let mut buffer = WorkBuffer::new(payload);
        let mut tried = 0u64;
        for nonce in range {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            tried += 1;
            if buffer.meets(nonce, difficulty) {
                // Capacity covers every worker and the receiver outlives the scope.
                let _ = results.send((index, nonce));
                break;
            }
        }

        self.stats.add(STAT_HASHES, tried);
        trace!(worker = index, tried, "worker finished");
    }
}

impl Default for WorkGenerator {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

fn wait_for_result(
    rx: &Receiver<(usize, u64)>,
    wait: Wait<'_>,
    started: Instant,
) -> Result<(usize, u64), WorkError> {
    match wait {
        Wait::Forever => rx.recv().map_err(|_| WorkError::Exhausted),
        Wait::Until(cancel) => loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(WorkError::Cancelled);
            }
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(found) => return Ok(found),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(WorkError::Exhausted),
            }
        },
        Wait::Timeout(timeout) => match rx.recv_timeout(timeout) {
            Ok(found) => Ok(found),
            Err(RecvTimeoutError::Timeout) => Err(WorkError::TimedOut {
                elapsed: started.elapsed(),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(WorkError::Exhausted),
        },
    }
}

/// Counts a worker as alive until dropped.
struct LiveWorker<'a>(&'a AtomicUsize);

impl<'a> LiveWorker<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for LiveWorker<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
