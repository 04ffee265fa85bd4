use crate::{PanicPolicy, pool::manager::Shared, work::BoxedWork};
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Worker task that pulls work items off the shared queue until told to stop.
///
/// On every iteration the worker races the cancellation token against the
/// queue. Cancellation is checked first, so a cancelled worker never takes
/// another item. A closed queue also ends the loop.
///
/// Items run on Tokio's blocking pool and are awaited to completion: once an
/// item has been taken, cancellation waits for it. A panicking item is caught
/// at that boundary and handled per [`PanicPolicy`].
///
/// Whichever way the loop ends, the worker's exit is recorded exactly once.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) async fn worker_loop(worker_id: usize, shared: Arc<Shared>, token: CancellationToken) {
    let _exit = shared.liveness.exit_guard();

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    loop {
        let work = tokio::select! {
            biased;
            () = token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::trace!("Worker {worker_id} observed cancellation");
                break;
            }
            work = shared.queue.recv() => match work {
                Some(work) => work,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Worker {worker_id} found the queue closed");
                    break;
                }
            },
        };

        match execute(work).await {
            Ok(()) => {
                shared.stats.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) if e.is_panic() => {
                shared.stats.panicked.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {worker_id} caught a panicking work item: {e}");

                if shared.config.panic_policy == PanicPolicy::Exit {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Worker {worker_id} exiting after panic");
                    break;
                }
            }
            Err(_e) => {
                // The runtime is shutting down and dropped the item unrun.
                #[cfg(feature = "tracing")]
                tracing::warn!("Worker {worker_id} lost a work item: {_e}");
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}

async fn execute(work: BoxedWork) -> Result<(), JoinError> {
    tokio::task::spawn_blocking(work).await
}
