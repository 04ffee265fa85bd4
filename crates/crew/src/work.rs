//! Units of work accepted by the pool.
//!
//! Anything implementing [`Work`] can be submitted. Plain closures are adapted
//! with [`Job`], and `()` is the no-op item.

/// A fire-and-forget unit of work: no arguments, no result.
///
/// A work item runs exactly once, on exactly one worker. Panics are caught at
/// the worker's execution boundary and handled according to the pool's
/// [`PanicPolicy`](crate::PanicPolicy).
pub trait Work: Send + 'static {
    fn work(self);
}

/// Adapts a zero-argument closure into a [`Work`] item.
#[derive(Clone, Copy)]
pub struct Job<F>(F);

impl<F> Job<F>
where
    F: FnOnce() + Send + 'static,
{
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> From<F> for Job<F>
where
    F: FnOnce() + Send + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl<F> Work for Job<F>
where
    F: FnOnce() + Send + 'static,
{
    fn work(self) {
        (self.0)();
    }
}

impl Work for () {
    fn work(self) {}
}

impl Work for Box<dyn FnOnce() + Send> {
    fn work(self) {
        self();
    }
}

/// Type-erased work item as carried by the submission queue.
pub(crate) type BoxedWork = Box<dyn FnOnce() + Send>;

pub(crate) fn boxed<W: Work>(item: W) -> BoxedWork {
    Box::new(move || item.work())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Increment(Arc<AtomicUsize>);

    impl Work for Increment {
        fn work(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn named_and_closure_items_run_once() {
        let hits = Arc::new(AtomicUsize::new(0));

        boxed(Increment(hits.clone()))();
        let h = hits.clone();
        boxed(Job::new(move || {
            h.fetch_add(10, Ordering::SeqCst);
        }))();
        let h = hits.clone();
        let erased: Box<dyn FnOnce() + Send> = Box::new(move || {
            h.fetch_add(100, Ordering::SeqCst);
        });
        boxed(erased)();
        boxed(())();

        assert_eq!(hits.load(Ordering::SeqCst), 111);
    }
}
