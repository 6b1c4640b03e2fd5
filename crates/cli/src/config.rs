//! Process configuration, read from the environment.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use sysbatch_core::{BatchError, BatchResult};
use sysbatch_jobs::JobsConfig;
use sysbatch_observability::LogFormat;

pub const CLEANUP_DIR_ENV: &str = "SYSBATCH_CLEANUP_DIR";
pub const CLEANUP_MAX_AGE_DAYS_ENV: &str = "SYSBATCH_CLEANUP_MAX_AGE_DAYS";
pub const LOW_STOCK_THRESHOLD_ENV: &str = "SYSBATCH_LOW_STOCK_THRESHOLD";
pub const INVENTORY_FILE_ENV: &str = "SYSBATCH_INVENTORY_FILE";
pub const LOG_FORMAT_ENV: &str = "SYSBATCH_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub jobs: JobsConfig,
    /// JSON array of `{ "item_name", "stock" }`; without it the inventory is empty.
    pub inventory_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl CliConfig {
    pub fn load() -> BatchResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> BatchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = JobsConfig::default();

        let cleanup_dir = var(CLEANUP_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.cleanup_dir);
        let cleanup_max_age_days =
            parse_var(CLEANUP_MAX_AGE_DAYS_ENV, var(CLEANUP_MAX_AGE_DAYS_ENV), defaults.cleanup_max_age_days)?;
        let low_stock_threshold =
            parse_var(LOW_STOCK_THRESHOLD_ENV, var(LOW_STOCK_THRESHOLD_ENV), defaults.low_stock_threshold)?;
        let inventory_file = var(INVENTORY_FILE_ENV).map(PathBuf::from);
        let log_format = parse_var(LOG_FORMAT_ENV, var(LOG_FORMAT_ENV), LogFormat::default())?;

        if low_stock_threshold < 0 {
            return Err(BatchError::configuration(format!(
                "{LOW_STOCK_THRESHOLD_ENV} must not be negative, got {low_stock_threshold}"
            )));
        }

        Ok(Self {
            jobs: JobsConfig {
                cleanup_dir,
                cleanup_max_age_days,
                low_stock_threshold,
            },
            inventory_file,
            log_format,
        })
    }
}

fn parse_var<T>(name: &str, value: Option<String>, default: T) -> BatchResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(value) => value.parse::<T>().map_err(|error| {
            BatchError::configuration(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
