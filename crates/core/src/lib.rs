//! `sysbatch-core`: shared building blocks for the batch workspace.
//!
//! This crate holds the error model and identifiers every other crate speaks.
//! It has no IO and no knowledge of jobs or steps.

pub mod error;
pub mod id;

pub use error::{BatchError, BatchResult};
pub use id::{JobExecutionId, StepExecutionId};
