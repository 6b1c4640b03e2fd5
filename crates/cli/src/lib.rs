//! `sysbatch` command-line front end.
//!
//! Configuration comes from the environment (optionally seeded from a `.env`
//! file), logs go to stderr, and the execution summary of a launched job goes
//! to stdout as JSON.
//!
//! Exit codes: `0` job completed, `1` job failed, `2` launch rejected or
//! configuration error.

pub mod app;
pub mod config;

pub use app::{Cli, Command};
pub use config::CliConfig;
