#![doc = include_str!("../README.md")]

mod config;
mod error;
pub mod global;
mod pool;
mod work;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::pool::*;
pub use crate::work::{Job, Work};
// Public re-export so callers can build the shutdown signal without naming
// `tokio-util` themselves.
pub use tokio_util::sync::CancellationToken;
