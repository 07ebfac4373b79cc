use thiserror::Error;

use super::model::TimeRepresentation;

/// Failures raised by the time-axis operations on a dataset.
#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("column '{column}' is {found}, expected {expected}")]
    TypeConversion {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("column '{0}' does not exist")]
    MissingColumn(String),

    #[error("column '{column}' is already in {representation} representation")]
    AlreadyInRepresentation {
        column: String,
        representation: TimeRepresentation,
    },

    #[error("MJD value {0} cannot be represented as a timestamp")]
    OutOfRange(f64),

    #[error("time axis from {anchor} has only {available} of {rows} timestamps")]
    TimeAxisOverflow {
        anchor: chrono::NaiveDateTime,
        rows: usize,
        available: usize,
    },
}
