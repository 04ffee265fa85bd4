use anyhow::bail;
use clap::Parser;
use crew::{Config, DEFAULT_WORKER_COUNT, PanicPolicy};
use std::time::Duration;

/// Jobs run on Tokio's blocking pool, which defaults to 512 threads. More
/// workers than that would queue for a thread instead of running.
pub const MAX_WORKERS: usize = 512;

/// Upper bound for a synthetic job's sleep.
pub const MAX_JOB_MILLIS: u64 = 60_000;

/// Runtime configuration for the `crew` binary.
///
/// All values are parsed from CLI arguments or environment variables.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "crew",
    version,
    about = "Drive a fixed-size worker pool with synthetic jobs"
)]
pub struct CliArgs {
    /// Number of workers in the pool. Zero selects the default of 10.
    ///
    /// Environment variable: `CREW_WORKERS`
    #[arg(long, env = "CREW_WORKERS", default_value_t = DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Number of jobs the queue buffers ahead of the workers.
    ///
    /// Zero makes every submission wait until a worker takes the job.
    ///
    /// Environment variable: `CREW_QUEUE_CAPACITY`
    #[arg(long, env = "CREW_QUEUE_CAPACITY", default_value_t = 0)]
    pub queue_capacity: usize,

    /// What a worker does after a job panics: `isolate` or `exit`.
    ///
    /// Environment variable: `CREW_PANIC_POLICY`
    #[arg(long, env = "CREW_PANIC_POLICY", default_value_t = PanicPolicy::Isolate)]
    pub panic_policy: PanicPolicy,

    /// Number of synthetic jobs to submit.
    ///
    /// Environment variable: `CREW_JOBS`
    #[arg(long, env = "CREW_JOBS", default_value_t = 100)]
    pub jobs: u64,

    /// How long each synthetic job sleeps, in milliseconds.
    ///
    /// Environment variable: `CREW_JOB_MILLIS`
    #[arg(long, env = "CREW_JOB_MILLIS", default_value_t = 10)]
    pub job_millis: u64,

    /// Cancel the pool after this many milliseconds. Zero waits for a signal.
    ///
    /// Environment variable: `CREW_RUN_FOR_MS`
    #[arg(long, env = "CREW_RUN_FOR_MS", default_value_t = 0)]
    pub run_for_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub pool: Config,
    pub jobs: u64,
    pub job_duration: Duration,
    pub run_for: Option<Duration>,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.workers > MAX_WORKERS {
            bail!(
                "CREW_WORKERS ({}) exceeds the blocking thread limit (max = {})",
                args.workers,
                MAX_WORKERS
            );
        }

        if args.job_millis > MAX_JOB_MILLIS {
            bail!(
                "CREW_JOB_MILLIS ({}) exceeds the maximum job duration (max = {})",
                args.job_millis,
                MAX_JOB_MILLIS
            );
        }

        let pool = Config::new(args.workers, args.queue_capacity)
            .with_panic_policy(args.panic_policy)
            .resolved();

        Ok(Self {
            pool,
            jobs: args.jobs,
            job_duration: Duration::from_millis(args.job_millis),
            run_for: (args.run_for_ms > 0).then(|| Duration::from_millis(args.run_for_ms)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("crew").chain(args.iter().copied()))?;
        CliConfig::try_from(args)
    }

    #[test]
    fn flags_map_onto_pool_config() {
        let config = parse(&[
            "--workers",
            "4",
            "--queue-capacity",
            "8",
            "--panic-policy",
            "exit",
            "--job-millis",
            "3",
            "--run-for-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(config.pool.worker_count, 4);
        assert_eq!(config.pool.queue_capacity, 8);
        assert_eq!(config.pool.panic_policy, PanicPolicy::Exit);
        assert_eq!(config.job_duration, Duration::from_millis(3));
        assert_eq!(config.run_for, Some(Duration::from_millis(250)));
    }

    #[test]
    fn zero_workers_and_deadline_fall_back() {
        let config = parse(&["--workers", "0", "--run-for-ms", "0"]).unwrap();
        assert_eq!(config.pool.worker_count, DEFAULT_WORKER_COUNT);
        assert_eq!(config.run_for, None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(parse(&["--workers", "513"]).is_err());
        assert!(parse(&["--job-millis", "60001"]).is_err());
        assert!(parse(&["--panic-policy", "restart"]).is_err());
    }
}
