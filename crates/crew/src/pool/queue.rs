//! The single submission queue shared by producers and workers.
//!
//! A bounded [`mpsc`] channel carries [`Envelope`]s. Workers share the
//! receiving half behind an async mutex, so each item is handed to exactly one
//! worker in FIFO order.
//!
//! Tokio channels cannot have zero capacity. A rendezvous queue is therefore a
//! one-slot channel where every envelope carries a hand-off acknowledgement:
//! the sender waits until a worker has taken the item out of the slot. A
//! submitter that stops waiting before then withdraws its item: the worker
//! finds the acknowledgement unwanted and drops the item unrun.

use crate::{Error, Result, work::BoxedWork};
use portable_atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc, oneshot};

struct Envelope {
    work: BoxedWork,
    handoff: Option<oneshot::Sender<()>>,
}

pub(crate) struct Queue {
    tx: mpsc::Sender<Envelope>,
    rx: Mutex<mpsc::Receiver<Envelope>>,
    capacity: usize,
    accepted: AtomicU64,
    closes: AtomicUsize,
}

impl Queue {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
            accepted: AtomicU64::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    const fn is_rendezvous(&self) -> bool {
        self.capacity == 0
    }

    /// Enqueues a work item.
    ///
    /// Waits for buffer space, and for a rendezvous queue also waits until a
    /// worker has taken the item.
    ///
    /// Cancel safe: dropping the future before it resolves withdraws the item.
    /// The one exception is a rendezvous hand-off that a worker completed in
    /// the same instant; that item runs and is counted as accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the queue closed before the item was
    /// accepted. The item is dropped without running.
    pub(crate) async fn send(&self, work: BoxedWork) -> Result<()> {
        if !self.is_rendezvous() {
            self.tx
                .send(Envelope {
                    work,
                    handoff: None,
                })
                .await
                .map_err(|_| Error::QueueClosed)?;
            self.accepted.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let (handoff, accepted) = oneshot::channel();
        self.tx
            .send(Envelope {
                work,
                handoff: Some(handoff),
            })
            .await
            .map_err(|_| Error::QueueClosed)?;
        accepted.await.map_err(|_| Error::QueueClosed)
    }

    /// Takes the next item, or `None` once the queue is closed and empty.
    /// Items withdrawn by their submitter are skipped.
    ///
    /// Cancel safe: dropping the future before it resolves leaves the item in
    /// the queue for another worker.
    pub(crate) async fn recv(&self) -> Option<BoxedWork> {
        let mut rx = self.rx.lock().await;
        loop {
            let envelope = rx.recv().await?;
            if let Some(work) = self.accept(envelope) {
                return Some(work);
            }
        }
    }

    fn accept(&self, envelope: Envelope) -> Option<BoxedWork> {
        let Envelope { work, handoff } = envelope;
        if let Some(handoff) = handoff {
            // Fails only when the submitter stopped waiting; drop the item.
            handoff.send(()).ok()?;
            self.accepted.fetch_add(1, Ordering::Relaxed);
        }
        Some(work)
    }

    /// Closes the queue and drops anything still buffered, which releases
    /// submitters waiting on a rendezvous hand-off with [`Error::QueueClosed`].
    ///
    /// Returns the number of items discarded.
    pub(crate) async fn close(&self) -> usize {
        let mut rx = self.rx.lock().await;
        rx.close();
        let mut discarded = 0;
        while rx.try_recv().is_ok() {
            discarded += 1;
        }
        self.closes.fetch_add(1, Ordering::AcqRel);
        discarded
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Items handed to the queue: buffered, or taken by a worker for a
    /// rendezvous queue.
    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }
}
