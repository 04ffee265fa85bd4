//! Pool configuration.
//!
//! A [`Config`] is resolved once by [`WorkerPool::start`] and is immutable for
//! the lifetime of the pool. A `worker_count` of zero means "use the default"
//! and a `queue_capacity` of zero makes the queue a rendezvous point: a
//! submission completes only when a worker takes the item.
//!
//! [`WorkerPool::start`]: crate::WorkerPool::start

use crate::{Error, Result};
use core::{fmt, str::FromStr};

/// Number of workers started when the configuration leaves it unset.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Default queue capacity. Zero is a rendezvous (unbuffered) queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 0;

/// What a worker does after a work item panics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PanicPolicy {
    /// Record the panic and keep the worker running. Pool capacity is kept.
    #[default]
    Isolate,
    /// Record the panic and stop the worker, permanently reducing pool
    /// capacity by one.
    Exit,
}

impl fmt::Display for PanicPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isolate => write!(f, "isolate"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

impl FromStr for PanicPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "exit" => Ok(Self::Exit),
            other => Err(Error::InvalidConfig {
                reason: format!("unknown panic policy `{other}` (expected `isolate` or `exit`)"),
            }),
        }
    }
}

/// Worker pool configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of workers to start. Zero resolves to [`DEFAULT_WORKER_COUNT`].
    pub worker_count: usize,
    /// Number of items the queue buffers ahead of the workers. Zero makes
    /// every submission wait for a worker to take the item.
    pub queue_capacity: usize,
    /// Behavior of a worker whose work item panicked.
    pub panic_policy: PanicPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT, DEFAULT_QUEUE_CAPACITY)
    }
}

impl Config {
    pub const fn new(worker_count: usize, queue_capacity: usize) -> Self {
        Self {
            worker_count,
            queue_capacity,
            panic_policy: PanicPolicy::Isolate,
        }
    }

    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    #[must_use]
    pub const fn with_panic_policy(mut self, panic_policy: PanicPolicy) -> Self {
        self.panic_policy = panic_policy;
        self
    }

    /// Returns the configuration with defaults substituted for unset values.
    #[must_use]
    pub const fn resolved(self) -> Self {
        if self.worker_count == 0 {
            self.with_worker_count(DEFAULT_WORKER_COUNT)
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_workers_unbuffered() {
        let config = Config::default();
        assert_eq!(config.worker_count, 10);
        assert_eq!(config.queue_capacity, 0);
        assert_eq!(config.panic_policy, PanicPolicy::Isolate);
    }

    #[test]
    fn zero_workers_resolves_to_default() {
        let config = Config::new(0, 4).resolved();
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
        assert_eq!(config.queue_capacity, 4);

        let config = Config::new(3, 0).resolved();
        assert_eq!(config.worker_count, 3);
    }

    #[test]
    fn panic_policy_parses_case_insensitively() {
        assert_eq!("isolate".parse::<PanicPolicy>(), Ok(PanicPolicy::Isolate));
        assert_eq!(" EXIT ".parse::<PanicPolicy>(), Ok(PanicPolicy::Exit));
        assert!(matches!(
            "restart".parse::<PanicPolicy>(),
            Err(Error::InvalidConfig { .. })
        ));
        assert_eq!(PanicPolicy::Exit.to_string(), "exit");
    }
}
