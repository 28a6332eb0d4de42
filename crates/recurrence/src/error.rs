//! Error types for pattern validation and materialization.

use serde::Serialize;
use shiftgrid_core::CoreError;

/// A single problem found while validating a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternViolation {
    /// Field location, e.g. `"days_of_week"` or `"days_of_week[2]"`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PatternViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecurrenceError {
    /// The pattern is malformed. Raised before any date is generated.
    #[error("invalid recurrence pattern: {}", join(.0))]
    Validation(Vec<PatternViolation>),

    /// The shift template shared by every occurrence is malformed.
    #[error("invalid shift template: {0}")]
    InvalidTemplate(#[from] CoreError),
}

impl RecurrenceError {
    pub fn violations(&self) -> &[PatternViolation] {
        match self {
            RecurrenceError::Validation(v) => v,
            RecurrenceError::InvalidTemplate(_) => &[],
        }
    }
}

fn join(violations: &[PatternViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
