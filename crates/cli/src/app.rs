//! Command-line surface: argument parsing and job dispatch.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_engine::{BatchStatus, JobExecution, JobLauncher, JobParameters, JobRegistry};
use sysbatch_jobs::{
    Collaborators, InMemoryInventoryRepository, InventoryRepository, JsonFileInventoryRepository,
    LogNotificationSender, register_jobs,
};

use crate::config::CliConfig;

pub const EXIT_COMPLETED: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "sysbatch", version, about = "Run housekeeping and demo batch jobs")]
pub struct Cli {
    /// Read environment variables from this file before anything else.
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the registered jobs and their steps.
    List,
    /// Launch one job and print its execution as JSON.
    Run {
        /// Name of the job to launch.
        job: String,
        /// Job parameters as `key=value[,type[,identifying]]`.
        #[arg(value_name = "PARAM")]
        params: Vec<String>,
    },
}

/// Whole process flow after argument parsing; returns the exit code.
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<u8> {
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = CliConfig::load().context("invalid configuration")?;
    sysbatch_observability::init(config.log_format);

    let launcher = build_launcher(&config)?;
    execute(&cli.command, &launcher, out)
}

/// Registry with every job, wired to the configured collaborators.
pub fn build_launcher(config: &CliConfig) -> BatchResult<JobLauncher> {
    let inventory: Arc<dyn InventoryRepository> = match &config.inventory_file {
        Some(path) => Arc::new(JsonFileInventoryRepository::new(path)),
        None => Arc::new(InMemoryInventoryRepository::default()),
    };
    let collaborators = Collaborators {
        inventory,
        notifier: Arc::new(LogNotificationSender),
    };

    let mut registry = JobRegistry::new();
    register_jobs(&mut registry, &config.jobs, collaborators)?;
    Ok(JobLauncher::new(registry))
}

pub fn execute(command: &Command, launcher: &JobLauncher, out: &mut impl Write) -> anyhow::Result<u8> {
    match command {
        Command::List => {
            for name in launcher.registry().names() {
                let steps = launcher
                    .registry()
                    .get(name)
                    .map(|job| job.step_names().join(", "))
                    .unwrap_or_default();
                writeln!(out, "{name}\t{steps}")?;
            }
            Ok(EXIT_COMPLETED)
        }
        Command::Run { job, params } => {
            let launched = JobParameters::parse_args(params)
                .and_then(|parameters| launcher.run(job, parameters));
            report(job, launched, out)
        }
    }
}

fn report(job: &str, launched: BatchResult<JobExecution>, out: &mut impl Write) -> anyhow::Result<u8> {
    match launched {
        Ok(execution) => {
            serde_json::to_writer_pretty(&mut *out, &execution)
                .context("failed to write execution summary")?;
            writeln!(out)?;
            let code = exit_code(execution.status);
            info!(job, execution_id = %execution.id, status = ?execution.status, "launch finished");
            Ok(code)
        }
        Err(e) => {
            if e.is_rejection() {
                warn!(job, error = %e, "launch rejected");
            } else {
                error!(job, error = %e, "launch failed");
            }
            eprintln!("sysbatch: {e}");
            Ok(rejection_exit_code(&e))
        }
    }
}

pub fn exit_code(status: BatchStatus) -> u8 {
    if status.is_success() {
        EXIT_COMPLETED
    } else {
        EXIT_FAILED
    }
}

fn rejection_exit_code(error: &BatchError) -> u8 {
    if error.is_rejection() {
        EXIT_REJECTED
    } else {
        EXIT_FAILED
    }
}
