//! Batch error model.

use thiserror::Error;

/// Result type used across the batch crates.
pub type BatchResult<T> = Result<T, BatchError>;

/// Batch-level error.
///
/// Everything that stops a job from being launched (bad parameters, unknown
/// job, broken configuration) is one of these. Per-entry outcomes of a sweep
/// are never errors; they are reported in the sweep result instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Job parameters were rejected by a validator.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required job parameter is absent.
    #[error("missing job parameter: {0}")]
    MissingParameter(String),

    /// A job parameter exists but cannot be read as the requested type.
    #[error("job parameter `{key}` cannot be read as {expected}: {reason}")]
    ParameterType {
        key: String,
        expected: &'static str,
        reason: String,
    },

    /// A job parameter could not be parsed from its textual form.
    #[error("invalid job parameter: {0}")]
    InvalidParameter(String),

    /// No job is registered under the requested name.
    #[error("unknown job: {0}")]
    UnknownJob(String),

    /// Conflicting definitions (e.g. a job name registered twice).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Broken job or process configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external collaborator (repository, notification channel) failed.
    #[error("collaborator failed: {0}")]
    Collaborator(String),
}

impl BatchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingParameter(key.into())
    }

    pub fn parameter_type(
        key: impl Into<String>,
        expected: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::ParameterType {
            key: key.into(),
            expected,
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn unknown_job(name: impl Into<String>) -> Self {
        Self::UnknownJob(name.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// True for failures that reject a launch before any work starts.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BatchError::Collaborator(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_type_message_names_key_and_type() {
        let err = BatchError::parameter_type("securityLevel", "long", "invalid digit");
        assert_eq!(
            err.to_string(),
            "job parameter `securityLevel` cannot be read as long: invalid digit"
        );
    }

    #[test]
    fn collaborator_failures_are_not_rejections() {
        assert!(BatchError::missing("x").is_rejection());
        assert!(BatchError::unknown_job("x").is_rejection());
        assert!(!BatchError::collaborator("smtp down").is_rejection());
    }
}
