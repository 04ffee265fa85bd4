//! Console logging for the `crew` binary.
//!
//! Library events from `crew` (pool start, worker lifecycle, caught panics,
//! queue close) are emitted through `tracing` and printed here by a
//! `tracing_subscriber::fmt` layer. Verbosity follows `RUST_LOG` and defaults
//! to `info`; use `RUST_LOG=crew=trace` to see every worker start and stop.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
