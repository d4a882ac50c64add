/*
Errors raised by the sampler, the engine and the reporting sinks.

There is no transient category: every variant is fatal for the run. A
configuration error is caught before the first sweep, the rest abort the
sweep loop where they happen.
*/

use std::path::PathBuf;

#[derive(Debug)]
pub enum SamplerError {
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    /// The engine produced a non-finite energy or pressure.
    EngineEvaluation {
        quantity: &'static str,
        value: f64,
    },
    Engine(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Csv(csv::Error),
}

impl SamplerError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SamplerError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SamplerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Pass `value` through unless it is NaN or infinite.
pub(crate) fn finite(quantity: &'static str, value: f64) -> Result<f64, SamplerError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SamplerError::EngineEvaluation { quantity, value })
    }
}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::InvalidConfig { field, reason } => {
                write!(f, "invalid configuration for `{field}`: {reason}")
            }
            SamplerError::EngineEvaluation { quantity, value } => {
                write!(f, "engine produced a non-finite {quantity} ({value})")
            }
            SamplerError::Engine(msg) => write!(f, "engine error: {msg}"),
            SamplerError::Io { path, source } => {
                write!(f, "I/O error on `{}`: {source}", path.display())
            }
            SamplerError::Json { path, source } => {
                write!(f, "invalid JSON in `{}`: {source}", path.display())
            }
            SamplerError::Csv(source) => write!(f, "failed to write thermo record: {source}"),
        }
    }
}

impl std::error::Error for SamplerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SamplerError::Io { source, .. } => Some(source),
            SamplerError::Json { source, .. } => Some(source),
            SamplerError::Csv(source) => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for SamplerError {
    fn from(source: csv::Error) -> Self {
        SamplerError::Csv(source)
    }
}
