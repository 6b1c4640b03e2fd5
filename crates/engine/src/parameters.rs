//! Typed job parameters.
//!
//! Parameters arrive as text (`key=value[,type[,identifying]]`) or are built
//! programmatically. Lookups coerce string values into the requested type, so a
//! caller can pass `securityLevel=3` without a type suffix and still read it as
//! a long.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use sysbatch_core::{BatchError, BatchResult};

/// Date format accepted for `date` parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time format accepted for `datetime` parameters.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The value carried by a job parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    String(String),
    Long(i64),
    Double(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ParameterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::String(_) => "string",
            ParameterValue::Long(_) => "long",
            ParameterValue::Double(_) => "double",
            ParameterValue::Date(_) => "date",
            ParameterValue::DateTime(_) => "datetime",
        }
    }

    /// Parse `raw` as a value of the named type.
    pub fn parse(type_name: &str, raw: &str) -> BatchResult<Self> {
        let invalid = |e: &dyn fmt::Display| {
            BatchError::invalid_parameter(format!("`{raw}` is not a valid {type_name}: {e}"))
        };
        match type_name {
            "string" => Ok(ParameterValue::String(raw.to_string())),
            "long" => raw
                .trim()
                .parse::<i64>()
                .map(ParameterValue::Long)
                .map_err(|e| invalid(&e)),
            "double" => raw
                .trim()
                .parse::<f64>()
                .map(ParameterValue::Double)
                .map_err(|e| invalid(&e)),
            "date" => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(ParameterValue::Date)
                .map_err(|e| invalid(&e)),
            "datetime" => NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT)
                .map(ParameterValue::DateTime)
                .map_err(|e| invalid(&e)),
            other => Err(BatchError::invalid_parameter(format!(
                "unknown parameter type `{other}` (expected string, long, double, date or datetime)"
            ))),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::String(s) => f.write_str(s),
            ParameterValue::Long(v) => write!(f, "{v}"),
            ParameterValue::Double(v) => write!(f, "{v}"),
            ParameterValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            ParameterValue::DateTime(d) => write!(f, "{}", d.format(DATE_TIME_FORMAT)),
        }
    }
}

/// A single named job parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameter {
    pub value: ParameterValue,
    /// Identifying parameters distinguish one job instance from another.
    pub identifying: bool,
}

impl JobParameter {
    pub fn new(value: ParameterValue) -> Self {
        Self {
            value,
            identifying: true,
        }
    }

    pub fn non_identifying(value: ParameterValue) -> Self {
        Self {
            value,
            identifying: false,
        }
    }
}

/// Types a parameter value can be read as.
pub trait FromParameter: Sized {
    const TYPE_NAME: &'static str;

    fn from_parameter(key: &str, value: &ParameterValue) -> BatchResult<Self>;
}

fn coerce_string<T: FromStr>(key: &str, expected: &'static str, raw: &str) -> BatchResult<T>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| BatchError::parameter_type(key, expected, e.to_string()))
}

fn mismatch(key: &str, expected: &'static str, value: &ParameterValue) -> BatchError {
    BatchError::parameter_type(key, expected, format!("value has type {}", value.type_name()))
}

impl FromParameter for String {
    const TYPE_NAME: &'static str = "string";

    fn from_parameter(_key: &str, value: &ParameterValue) -> BatchResult<Self> {
        Ok(value.to_string())
    }
}

impl FromParameter for i64 {
    const TYPE_NAME: &'static str = "long";

    fn from_parameter(key: &str, value: &ParameterValue) -> BatchResult<Self> {
        match value {
            ParameterValue::Long(v) => Ok(*v),
            ParameterValue::String(s) => coerce_string(key, Self::TYPE_NAME, s),
            other => Err(mismatch(key, Self::TYPE_NAME, other)),
        }
    }
}

impl FromParameter for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_parameter(key: &str, value: &ParameterValue) -> BatchResult<Self> {
        match value {
            ParameterValue::Double(v) => Ok(*v),
            ParameterValue::Long(v) => Ok(*v as f64),
            ParameterValue::String(s) => coerce_string(key, Self::TYPE_NAME, s),
            other => Err(mismatch(key, Self::TYPE_NAME, other)),
        }
    }
}

impl FromParameter for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn from_parameter(key: &str, value: &ParameterValue) -> BatchResult<Self> {
        match value {
            ParameterValue::Date(d) => Ok(*d),
            ParameterValue::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map_err(|e| BatchError::parameter_type(key, Self::TYPE_NAME, e.to_string())),
            other => Err(mismatch(key, Self::TYPE_NAME, other)),
        }
    }
}

impl FromParameter for NaiveDateTime {
    const TYPE_NAME: &'static str = "datetime";

    fn from_parameter(key: &str, value: &ParameterValue) -> BatchResult<Self> {
        match value {
            ParameterValue::DateTime(d) => Ok(*d),
            ParameterValue::String(s) => NaiveDateTime::parse_from_str(s.trim(), DATE_TIME_FORMAT)
                .map_err(|e| BatchError::parameter_type(key, Self::TYPE_NAME, e.to_string())),
            other => Err(mismatch(key, Self::TYPE_NAME, other)),
        }
    }
}

/// The named parameters of one job launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobParameters {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> JobParametersBuilder {
        JobParametersBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JobParameter)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn parameter(&self, key: &str) -> Option<&JobParameter> {
        self.parameters.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, parameter: JobParameter) {
        self.parameters.insert(key.into(), parameter);
    }

    /// Read `key` as `T`. `Ok(None)` when absent, `Err` when present but unreadable.
    pub fn get<T: FromParameter>(&self, key: &str) -> BatchResult<Option<T>> {
        self.parameters
            .get(key)
            .map(|p| T::from_parameter(key, &p.value))
            .transpose()
    }

    /// Read `key` as `T`, failing when it is absent.
    pub fn require<T: FromParameter>(&self, key: &str) -> BatchResult<T> {
        self.get(key)?.ok_or_else(|| BatchError::missing(key))
    }

    /// Read `key` through `FromStr` (used for closed enums such as difficulty tags).
    pub fn get_parsed<T>(&self, key: &str) -> BatchResult<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.parameters.get(key) {
            None => Ok(None),
            Some(p) => p
                .value
                .to_string()
                .parse::<T>()
                .map(Some)
                .map_err(|e| BatchError::parameter_type(key, "enum", e.to_string())),
        }
    }

    pub fn get_string(&self, key: &str) -> BatchResult<Option<String>> {
        self.get(key)
    }

    pub fn get_long(&self, key: &str) -> BatchResult<Option<i64>> {
        self.get(key)
    }

    pub fn get_double(&self, key: &str) -> BatchResult<Option<f64>> {
        self.get(key)
    }

    pub fn get_date(&self, key: &str) -> BatchResult<Option<NaiveDate>> {
        self.get(key)
    }

    pub fn get_date_time(&self, key: &str) -> BatchResult<Option<NaiveDateTime>> {
        self.get(key)
    }

    /// The subset of parameters marked identifying.
    pub fn identifying_parameters(&self) -> JobParameters {
        JobParameters {
            parameters: self
                .parameters
                .iter()
                .filter(|(_, p)| p.identifying)
                .map(|(k, p)| (k.clone(), p.clone()))
                .collect(),
        }
    }

    /// Parse a list of `key=value[,type[,identifying]]` arguments.
    pub fn parse_args<I, S>(args: I) -> BatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = JobParameters::new();
        for arg in args {
            let (key, parameter) = parse_parameter(arg.as_ref())?;
            if params.contains_key(&key) {
                return Err(BatchError::invalid_parameter(format!(
                    "parameter `{key}` given more than once"
                )));
            }
            params.insert(key, parameter);
        }
        Ok(params)
    }
}

/// Parse one `key=value[,type[,identifying]]` argument.
///
/// The value runs up to the first comma; everything after it is the type and
/// the identifying flag. Values may contain `=` but not `,`.
pub fn parse_parameter(arg: &str) -> BatchResult<(String, JobParameter)> {
    let (key, rest) = arg
        .split_once('=')
        .ok_or_else(|| BatchError::invalid_parameter(format!("`{arg}` is not key=value")))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(BatchError::invalid_parameter(format!(
            "`{arg}` has an empty key"
        )));
    }

    let mut parts = rest.split(',');
    let raw = parts.next().unwrap_or_default();
    let type_name = parts.next().map(str::trim).unwrap_or("string");
    let identifying = match parts.next().map(str::trim) {
        None | Some("true") => true,
        Some("false") => false,
        Some(other) => {
            return Err(BatchError::invalid_parameter(format!(
                "`{key}`: identifying flag must be true or false, got `{other}`"
            )));
        }
    };
    if parts.next().is_some() {
        return Err(BatchError::invalid_parameter(format!(
            "`{arg}` has too many comma-separated parts"
        )));
    }

    let value = ParameterValue::parse(type_name, raw)?;
    let parameter = if identifying {
        JobParameter::new(value)
    } else {
        JobParameter::non_identifying(value)
    };
    Ok((key.to_string(), parameter))
}

/// Fluent builder for [`JobParameters`].
#[derive(Debug, Default)]
pub struct JobParametersBuilder {
    params: JobParameters,
}

impl JobParametersBuilder {
    pub fn add_parameter(mut self, key: impl Into<String>, parameter: JobParameter) -> Self {
        self.params.insert(key, parameter);
        self
    }

    pub fn add_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_parameter(key, JobParameter::new(ParameterValue::String(value.into())))
    }

    pub fn add_long(self, key: impl Into<String>, value: i64) -> Self {
        self.add_parameter(key, JobParameter::new(ParameterValue::Long(value)))
    }

    pub fn add_double(self, key: impl Into<String>, value: f64) -> Self {
        self.add_parameter(key, JobParameter::new(ParameterValue::Double(value)))
    }

    pub fn add_date(self, key: impl Into<String>, value: NaiveDate) -> Self {
        self.add_parameter(key, JobParameter::new(ParameterValue::Date(value)))
    }

    pub fn add_date_time(self, key: impl Into<String>, value: NaiveDateTime) -> Self {
        self.add_parameter(key, JobParameter::new(ParameterValue::DateTime(value)))
    }

    pub fn build(self) -> JobParameters {
        self.params
    }
}
