use portable_atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts exited workers for a pool of fixed size.
///
/// The pool is alive while `exited < workers`. The counter only ever grows and
/// is bumped exactly once per worker by an [`ExitGuard`]. The worker that
/// brings the count to `workers` wakes whoever waits in [`Self::all_exited`].
pub(crate) struct Liveness {
    workers: usize,
    exited: AtomicUsize,
    drained: Notify,
}

impl Liveness {
    pub(crate) fn new(workers: usize) -> Self {
        Self {
            workers,
            exited: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    pub(crate) const fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn exited(&self) -> usize {
        self.exited.load(Ordering::Acquire)
    }

    pub(crate) fn alive(&self) -> bool {
        self.exited() < self.workers
    }

    fn record_exit(&self) {
        let exited = self.exited.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(exited <= self.workers, "more exits than workers");
        if exited == self.workers {
            // `notify_one` stores a permit when nobody is waiting yet, so the
            // watcher cannot miss the final exit.
            self.drained.notify_one();
        }
    }

    /// Resolves once every worker has exited.
    pub(crate) async fn all_exited(&self) {
        while self.alive() {
            self.drained.notified().await;
        }
    }

    /// Returns a guard that records one worker exit when dropped, including
    /// when the worker task unwinds or is aborted.
    pub(crate) fn exit_guard(&self) -> ExitGuard<'_> {
        ExitGuard { liveness: self }
    }
}

pub(crate) struct ExitGuard<'a> {
    liveness: &'a Liveness,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.liveness.record_exit();
    }
}
