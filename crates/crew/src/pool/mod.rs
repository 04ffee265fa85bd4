mod liveness;
pub(crate) mod manager;
mod queue;
mod watcher;
mod worker;


pub use manager::{Stats, WorkerPool};
