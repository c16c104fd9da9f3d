use chrono::{DateTime, Utc};
use thiserror::Error;

//errors raised by the engine; every variant aborts the running backtest
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Expected {parameter} to be {expected}, got {actual} instead")]
    ArgumentType {
        parameter: String,
        expected: String,
        actual: String,
    },
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Bar data source failed")]
    DataSource(#[source] anyhow::Error),
    #[error("Strategy failed to create orders on bar {date}")]
    Strategy {
        date: DateTime<Utc>,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    //builds an argument type error from anything that can be displayed
    pub fn argument(
        parameter: impl Into<String>,
        expected: impl Into<String>,
        actual: impl std::fmt::Display,
    ) -> Self {
        EngineError::ArgumentType {
            parameter: parameter.into(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        EngineError::InvariantViolation(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

//checks that a number is finite, naming the offending field otherwise
pub(crate) fn ensure_finite(parameter: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::argument(parameter, "a finite number", value))
    }
}
