//! Configuration errors for Monte Carlo settings and pricing contexts.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Invalid engine or context configuration.
///
/// # Examples
/// ```
/// use pricer_pricing::ConfigError;
///
/// let err = ConfigError::InvalidPathCount(0);
/// assert_eq!(err.to_string(), "invalid path count 0: must be between 2 and 10000000");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Path count outside `[2, MAX_PATHS]`.
    #[error("invalid path count {0}: must be between 2 and 10000000")]
    InvalidPathCount(usize),

    /// Step count outside `[1, MAX_STEPS]`.
    #[error("invalid step count {0}: must be between 1 and 10000")]
    InvalidStepCount(usize),

    /// Out-of-range parameter.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// A rotation or curve override is missing a required field.
    #[error("missing field {field} for {key}")]
    MissingField {
        /// Field name.
        field: &'static str,
        /// Symbol or curve code the field belongs to.
        key: String,
    },

    /// TOML or file-system failure.
    #[error("configuration parse error: {0}")]
    Parse(String),
}

impl From<ConfigError> for PricingError {
    fn from(err: ConfigError) -> Self {
        PricingError::InvalidConfiguration(err.to_string())
    }
}
