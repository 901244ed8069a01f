//! Schedule generation error types.

use pricer_core::types::{DateError, PricingError};
use pricer_core::types::time::Date;
use thiserror::Error;

/// Errors from schedule construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Start date is not before end date.
    #[error("Start date {start} must be before end date {end}")]
    InvalidDateRange {
        /// Schedule start
        start: Date,
        /// Schedule end
        end: Date,
    },

    /// A builder field was not set.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// Adjustment collapsed every date.
    #[error("Schedule would generate no periods between {start} and {end}")]
    NoPeriods {
        /// Schedule start
        start: Date,
        /// Schedule end
        end: Date,
    },

    /// Frequency string not recognised.
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    /// Generation rule string not recognised.
    #[error("Unknown date generation rule: {0}")]
    UnknownGeneration(String),

    /// Date arithmetic failed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}

impl From<ScheduleError> for PricingError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::MissingField { .. } => PricingError::InsufficientInput(err.to_string()),
            _ => PricingError::InvalidConfiguration(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_insufficient_input() {
        let err: PricingError = ScheduleError::MissingField { field: "end" }.into();
        assert_eq!(err.kind(), "InsufficientInput");
        assert!(err.to_string().contains("end"));
    }

    #[test]
    fn test_range_is_configuration() {
        let d = Date::from_ymd(2024, 1, 1).unwrap();
        let err: PricingError = ScheduleError::InvalidDateRange { start: d, end: d }.into();
        assert_eq!(err.kind(), "InvalidConfiguration");
    }
}
