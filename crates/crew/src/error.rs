//! Error types for the worker pool.
//!
//! Submission is the only fallible hot path. A pool that has no running
//! workers refuses work with [`Error::NoWorkersAvailable`]; a submission that
//! loses the race against the shutdown watcher closing the queue surfaces as
//! [`Error::QueueClosed`] instead of being silently dropped.
//!
//! ## Error Cases
//! - `NoWorkersAvailable`: every worker has exited.
//! - `QueueClosed`: the queue was closed before a worker accepted the item.
//! - `NotStarted`: the process-wide pool was used before it was started.
//! - `AlreadyStarted`: the process-wide pool is still running.
//! - `InvalidConfig`: a configuration value could not be parsed.

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the worker pool.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// No workers are running, so the item was neither queued nor executed.
    #[error("no workers running")]
    NoWorkersAvailable,

    /// The submission queue closed before a worker took the item. The item
    /// was not executed.
    #[error("submission queue closed before the work item was accepted")]
    QueueClosed,

    /// The process-wide pool has not been started.
    #[error("worker pool has not been started")]
    NotStarted,

    /// The process-wide pool is running and has not shut down yet.
    #[error("worker pool is already running")]
    AlreadyStarted,

    /// A configuration value was rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
