//! Fixed-size pool of asynchronous workers fed by a single queue.
//!
//! This module defines [`WorkerPool`], a cloneable handle over a set of Tokio
//! worker tasks that pull work items from one shared FIFO queue. Each item is
//! executed by exactly one worker. The pool's lifetime is tied to a
//! [`CancellationToken`]: cancelling it is the only way to shut the pool down.
//!
//! Shutdown runs in order:
//!
//! 1. Every worker observes the cancellation between items and exits. An item
//!    that is already running finishes first.
//! 2. The shutdown watcher waits until all exits are recorded.
//! 3. The watcher closes the queue, discarding anything still buffered, and
//!    resolves [`WorkerPool::closed`].

use crate::{
    Config, Error, PanicPolicy, Result,
    pool::{liveness::Liveness, queue::Queue, watcher::shutdown_watcher, worker::worker_loop},
    work::{Job, Work, boxed},
};
use core::fmt;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared by the pool handle, its workers and the shutdown watcher.
pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) queue: Queue,
    pub(crate) liveness: Liveness,
    pub(crate) stats: Counters,
    pub(crate) closed: CancellationToken,
}

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) completed: AtomicU64,
    pub(crate) panicked: AtomicU64,
}

/// Point-in-time snapshot of a pool's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Configured number of workers.
    pub workers: usize,
    /// Workers that have exited. Never exceeds `workers`.
    pub exited: usize,
    /// Items accepted by the queue: buffered, or taken by a worker when the
    /// queue has zero capacity. Withdrawn submissions are not counted, so
    /// `completed + panicked <= submitted`.
    pub submitted: u64,
    /// Items that ran to completion.
    pub completed: u64,
    /// Items that panicked.
    pub panicked: u64,
    /// Times the queue was closed: 0 while running, 1 after shutdown.
    pub closes: usize,
}

/// A fixed-size pool of workers sharing one submission queue.
///
/// Cloning the handle is cheap and every clone refers to the same pool.
/// Dropping handles does not stop the workers; cancel the token passed to
/// [`WorkerPool::start`] instead.
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Starts a pool bound to `token`.
    ///
    /// Spawns `config.worker_count` worker tasks (10 when zero) and one
    /// shutdown watcher, then returns without waiting for any of them. Every
    /// call builds an independent pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start(token: CancellationToken, config: Config) -> Self {
        let config = config.resolved();
        let shared = Arc::new(Shared {
            config,
            queue: Queue::new(config.queue_capacity),
            liveness: Liveness::new(config.worker_count),
            stats: Counters::default(),
            closed: CancellationToken::new(),
        });

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting worker pool with {} workers (queue capacity {}, panic policy {})",
            config.worker_count,
            config.queue_capacity,
            config.panic_policy
        );

        for worker_id in 0..config.worker_count {
            tokio::spawn(worker_loop(worker_id, shared.clone(), token.clone()));
        }
        tokio::spawn(shutdown_watcher(shared.clone(), token));

        Self { shared }
    }

    /// Hands `item` to the pool.
    ///
    /// Waits until the queue accepts the item: with a zero-capacity queue that
    /// is when a worker takes it, otherwise when there is buffer space. The
    /// wait is unbounded; race it against a timer if a deadline is needed.
    ///
    /// Items buffered at the moment of cancellation are discarded unrun.
    ///
    /// Dropping this future (for example when a timeout fires) withdraws the
    /// item: a worker that later reaches it drops it without running it. Only
    /// a hand-off that a worker completed before the drop still runs.
    ///
    /// # Errors
    ///
    /// - [`Error::NoWorkersAvailable`] if every worker has exited. The item is
    ///   not queued.
    /// - [`Error::QueueClosed`] if shutdown closed the queue before the item
    ///   was accepted. The item is not executed.
    pub async fn submit<W: Work>(&self, item: W) -> Result<()> {
        if !self.alive() {
            return Err(Error::NoWorkersAvailable);
        }

        self.shared.queue.send(boxed(item)).await
    }

    /// Hands a plain closure to the pool. See [`WorkerPool::submit`].
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::submit`].
    pub async fn submit_fn<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Job::new(f)).await
    }

    /// Returns `true` while at least one worker has not exited.
    pub fn alive(&self) -> bool {
        self.shared.liveness.alive()
    }

    pub fn worker_count(&self) -> usize {
        self.shared.config.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    pub fn panic_policy(&self) -> PanicPolicy {
        self.shared.config.panic_policy
    }

    /// Returns `true` once the pool has fully shut down and closed its queue.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.is_cancelled()
    }

    /// Resolves once the pool has fully shut down: every worker has exited and
    /// the queue is closed.
    pub async fn closed(&self) {
        self.shared.closed.cancelled().await;
    }

    pub fn stats(&self) -> Stats {
        let shared = &self.shared;
        // Read `closes` first: a snapshot that shows the queue closed then
        // also shows every worker exited.
        let closes = shared.queue.closes();
        Stats {
            workers: shared.liveness.workers(),
            exited: shared.liveness.exited(),
            submitted: shared.queue.accepted(),
            completed: shared.stats.completed.load(Ordering::Relaxed),
            panicked: shared.stats.panicked.load(Ordering::Relaxed),
            closes,
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.shared.config)
            .field("alive", &self.alive())
            .field("queue_closed", &self.shared.queue.is_closed())
            .finish()
    }
}
