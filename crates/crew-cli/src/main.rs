#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig};
use crew::{CancellationToken, Error, WorkerPool};
use std::time::{Duration, Instant};
use telemetry::init_telemetry;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let token = CancellationToken::new();
    let pool = WorkerPool::start(token.clone(), config.pool);
    let started = Instant::now();

    let producer = tokio::spawn(feed_jobs(pool.clone(), config.jobs, config.job_duration));

    shutdown_signal(config.run_for).await;
    tracing::info!("Cancelling worker pool");
    token.cancel();
    pool.closed().await;

    let submitted = producer.await?;
    let stats = pool.stats();
    tracing::info!(
        "Pool shut down after {:?}: {} of {} jobs submitted, {} completed, {} panicked, {}/{} workers exited",
        started.elapsed(),
        submitted,
        config.jobs,
        stats.completed,
        stats.panicked,
        stats.exited,
        stats.workers
    );

    Ok(())
}

fn log_startup_info(config: &CliConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting crew with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting crew with {} workers, {} jobs of {:?}",
            config.pool.worker_count,
            config.jobs,
            config.job_duration
        );
    }
}

/// Submits `jobs` synthetic jobs and returns how many the pool accepted.
///
/// Stops early once the pool refuses work.
async fn feed_jobs(pool: WorkerPool, jobs: u64, job_duration: Duration) -> u64 {
    let mut submitted = 0;
    for job in 0..jobs {
        let res = pool
            .submit_fn(move || {
                std::thread::sleep(job_duration);
                tracing::trace!("Job {job} done");
            })
            .await;

        match res {
            Ok(()) => submitted += 1,
            Err(e @ (Error::NoWorkersAvailable | Error::QueueClosed)) => {
                tracing::info!("Stopped submitting after {submitted} jobs: {e}");
                break;
            }
            Err(e) => {
                tracing::error!("Unexpected submit failure: {e}");
                break;
            }
        }
    }
    tracing::debug!("Producer finished ({submitted} jobs submitted)");
    submitted
}

/// Resolves on Ctrl+C, SIGTERM, or once `run_for` has elapsed.
async fn shutdown_signal(run_for: Option<Duration>) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let deadline = async {
        match run_for {
            Some(run_for) => tokio::time::sleep(run_for).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = deadline => tracing::info!("Run time elapsed"),
    }
}
