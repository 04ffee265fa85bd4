use crate::pool::manager::Shared;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Tears the pool down once `token` is cancelled.
///
/// Waits for every worker to record its exit, then closes the submission queue
/// and marks the pool closed. This task is the only place the queue is
/// closed, and it runs once per pool.
pub(crate) async fn shutdown_watcher(shared: Arc<Shared>, token: CancellationToken) {
    token.cancelled().await;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Cancellation received, waiting for {} of {} workers to exit",
        shared.liveness.workers() - shared.liveness.exited(),
        shared.liveness.workers()
    );

    shared.liveness.all_exited().await;
    let _discarded = shared.queue.close().await;

    #[cfg(feature = "tracing")]
    tracing::info!("Worker pool closed ({_discarded} queued items discarded)");

    shared.closed.cancel();
}
