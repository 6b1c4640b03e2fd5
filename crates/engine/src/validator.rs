//! Job parameter validation.
//!
//! Validators run before any step of a job starts. A rejection means the job
//! never runs, not even partially.

use std::collections::BTreeSet;

use sysbatch_core::{BatchError, BatchResult};

use crate::parameters::JobParameters;

/// Pre-flight check of the parameters a job is launched with.
pub trait JobParametersValidator: Send + Sync {
    fn validate(&self, parameters: &JobParameters) -> BatchResult<()>;
}

impl<F> JobParametersValidator for F
where
    F: Fn(&JobParameters) -> BatchResult<()> + Send + Sync,
{
    fn validate(&self, parameters: &JobParameters) -> BatchResult<()> {
        self(parameters)
    }
}

/// Presence validator: required keys must be there, and when optional keys
/// are declared nothing outside `required ∪ optional` is accepted.
#[derive(Debug, Clone, Default)]
pub struct DefaultJobParametersValidator {
    required: BTreeSet<String>,
    optional: BTreeSet<String>,
}

impl DefaultJobParametersValidator {
    /// Fails when a key is declared both required and optional.
    pub fn new<R, O>(required: R, optional: O) -> BatchResult<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let required: BTreeSet<String> = required.into_iter().map(Into::into).collect();
        let optional: BTreeSet<String> = optional.into_iter().map(Into::into).collect();

        if let Some(key) = required.intersection(&optional).next() {
            return Err(BatchError::configuration(format!(
                "parameter `{key}` is declared both required and optional"
            )));
        }

        Ok(Self { required, optional })
    }
}

impl JobParametersValidator for DefaultJobParametersValidator {
    fn validate(&self, parameters: &JobParameters) -> BatchResult<()> {
        let missing: Vec<&str> = self
            .required
            .iter()
            .map(String::as_str)
            .filter(|key| !parameters.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(BatchError::validation(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }

        if !self.optional.is_empty() {
            let unexpected: Vec<&str> = parameters
                .keys()
                .filter(|key| !self.required.contains(*key) && !self.optional.contains(*key))
                .collect();
            if !unexpected.is_empty() {
                return Err(BatchError::validation(format!(
                    "unexpected parameters: {}",
                    unexpected.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// Runs validators in order; the first rejection wins.
#[derive(Default)]
pub struct CompositeJobParametersValidator {
    validators: Vec<Box<dyn JobParametersValidator>>,
}

impl CompositeJobParametersValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl JobParametersValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl JobParametersValidator for CompositeJobParametersValidator {
    fn validate(&self, parameters: &JobParameters) -> BatchResult<()> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(parameters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(args: &[&str]) -> JobParameters {
        JobParameters::parse_args(args.iter().copied()).unwrap()
    }

    #[test]
    fn required_key_must_be_present() {
        let validator = DefaultJobParametersValidator::new(["destructionPower"], ["targetSystem"]).unwrap();

        assert!(validator.validate(&params(&["destructionPower=5,long"])).is_ok());
        assert!(
            validator
                .validate(&params(&["destructionPower=5,long", "targetSystem=mainframe"]))
                .is_ok()
        );

        let err = validator.validate(&params(&["targetSystem=mainframe"])).unwrap_err();
        assert_eq!(
            err,
            BatchError::Validation("missing required parameters: destructionPower".to_string())
        );
    }

    #[test]
    fn unknown_keys_rejected_only_when_optional_keys_declared() {
        let strict = DefaultJobParametersValidator::new(["a"], ["b"]).unwrap();
        let err = strict.validate(&params(&["a=1", "c=3"])).unwrap_err();
        assert_eq!(err, BatchError::Validation("unexpected parameters: c".to_string()));

        let lenient = DefaultJobParametersValidator::new(["a"], Vec::<String>::new()).unwrap();
        assert!(lenient.validate(&params(&["a=1", "c=3"])).is_ok());
    }

    #[test]
    fn overlapping_declaration_is_a_configuration_error() {
        let err = DefaultJobParametersValidator::new(["a"], ["a"]).unwrap_err();
        assert!(matches!(err, BatchError::Configuration(_)));
    }

    #[test]
    fn composite_stops_at_first_rejection() {
        let composite = CompositeJobParametersValidator::new()
            .with(|_: &JobParameters| -> BatchResult<()> { Err(BatchError::validation("first")) })
            .with(|_: &JobParameters| -> BatchResult<()> { Err(BatchError::validation("second")) });

        assert_eq!(composite.len(), 2);
        assert_eq!(
            composite.validate(&JobParameters::new()).unwrap_err(),
            BatchError::Validation("first".to_string())
        );
    }

    #[test]
    fn empty_composite_accepts_everything() {
        let composite = CompositeJobParametersValidator::new();
        assert!(composite.is_empty());
        assert!(composite.validate(&params(&["anything=1"])).is_ok());
    }
}
