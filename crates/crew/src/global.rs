//! Process-wide pool.
//!
//! Convenience functions for programs that want a single pool reachable from
//! anywhere. They delegate to a [`WorkerPool`] stored in a global slot. Until
//! [`start`] has run every function fails with [`Error::NotStarted`], so a
//! never-started pool cannot be mistaken for a live or dead one.

use crate::{Config, Error, Result, Work, WorkerPool};
use std::sync::{PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

static POOL: RwLock<Option<WorkerPool>> = RwLock::new(None);

/// Starts the process-wide pool and returns a handle to it.
///
/// A pool with no running workers is replaced by the new one, whether it was
/// cancelled or lost every worker to panics under [`PanicPolicy::Exit`].
///
/// # Errors
///
/// Returns [`Error::AlreadyStarted`] if the current process-wide pool is still
/// alive.
///
/// [`PanicPolicy::Exit`]: crate::PanicPolicy::Exit
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn start(token: CancellationToken, config: Config) -> Result<WorkerPool> {
    let mut slot = POOL.write().unwrap_or_else(PoisonError::into_inner);
    if slot.as_ref().is_some_and(WorkerPool::alive) {
        return Err(Error::AlreadyStarted);
    }

    let pool = WorkerPool::start(token, config);
    *slot = Some(pool.clone());
    Ok(pool)
}

/// Returns a handle to the process-wide pool.
///
/// # Errors
///
/// Returns [`Error::NotStarted`] if [`start`] has not been called.
pub fn pool() -> Result<WorkerPool> {
    POOL.read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(Error::NotStarted)
}

/// Submits `item` to the process-wide pool. See [`WorkerPool::submit`].
///
/// # Errors
///
/// [`Error::NotStarted`] before [`start`], otherwise as
/// [`WorkerPool::submit`].
pub async fn submit<W: Work>(item: W) -> Result<()> {
    pool()?.submit(item).await
}

/// Submits a closure to the process-wide pool. See [`WorkerPool::submit_fn`].
///
/// # Errors
///
/// [`Error::NotStarted`] before [`start`], otherwise as
/// [`WorkerPool::submit`].
pub async fn submit_fn<F>(f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    pool()?.submit_fn(f).await
}

/// Reports whether the process-wide pool still has running workers.
///
/// # Errors
///
/// Returns [`Error::NotStarted`] if [`start`] has not been called.
pub fn alive() -> Result<bool> {
    Ok(pool()?.alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PanicPolicy;
    use core::time::Duration;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    // The global slot is shared by the whole test binary, so the full
    // lifecycle is exercised in one test.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn global_pool_lifecycle() {
        assert_eq!(alive(), Err(Error::NotStarted));
        assert_eq!(submit(()).await, Err(Error::NotStarted));
        assert_eq!(submit_fn(|| {}).await, Err(Error::NotStarted));
        assert!(matches!(pool(), Err(Error::NotStarted)));

        let token = CancellationToken::new();
        let first = start(token.clone(), Config::new(2, 0)).expect("first start");
        assert_eq!(alive(), Ok(true));
        assert!(matches!(
            start(CancellationToken::new(), Config::default()),
            Err(Error::AlreadyStarted)
        ));

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        submit_fn(move || flag.store(true, Ordering::SeqCst))
            .await
            .expect("submit to running pool");

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), first.closed())
            .await
            .expect("pool should close");
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(alive(), Ok(false));
        assert_eq!(submit(()).await, Err(Error::NoWorkersAvailable));

        let token = CancellationToken::new();
        let second = start(token.clone(), Config::new(1, 0)).expect("restart after close");
        assert_eq!(alive(), Ok(true));
        assert_eq!(second.worker_count(), 1);
        submit(()).await.expect("submit to restarted pool");
        token.cancel();
        second.closed().await;

        // A pool whose workers all exited after panics is dead but not
        // closed; it no longer blocks a restart.
        let dead_token = CancellationToken::new();
        let third = start(
            dead_token.clone(),
            Config::new(1, 0).with_panic_policy(PanicPolicy::Exit),
        )
        .expect("restart after close");
        submit_fn(|| panic!("retire the only worker"))
            .await
            .expect("submit to running pool");
        tokio::time::timeout(Duration::from_secs(1), async {
            while third.alive() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("worker should exit after panic");
        assert!(!third.is_closed());
        assert_eq!(alive(), Ok(false));

        let token = CancellationToken::new();
        let fourth = start(token.clone(), Config::new(1, 0)).expect("restart after dead pool");
        assert_eq!(alive(), Ok(true));
        token.cancel();
        dead_token.cancel();
        fourth.closed().await;
        third.closed().await;
    }
}
