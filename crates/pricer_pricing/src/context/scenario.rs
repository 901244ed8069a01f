//! Persistent curve scenarios.

use std::collections::BTreeMap;
use std::path::Path;

use pricer_core::market_data::{CurveAdjustment, CurveRotation};
use serde::Deserialize;

use super::config::{curve_adjustments, CurveValue};
use crate::error::ConfigError;

/// Curve adjustments applied to every pricing call under a context,
/// beneath any scoped layer.
///
/// # Examples
/// ```
/// use pricer_pricing::context::CurveScenario;
///
/// let scenario = CurveScenario::from_toml_str(r#"
///     parallel_shift = [{ curve_code = "CBD100461", value = 100.0 }]
/// "#).unwrap();
/// assert_eq!(scenario.adjustment("CBD100461").parallel_shift_bp, Some(100.0));
/// assert!(scenario.adjustment("SHIBOR").is_identity());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveScenario {
    adjustments: BTreeMap<String, CurveAdjustment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScenarioConfig {
    parallel_shift: Vec<CurveValue>,
    curve_shift: Vec<CurveValue>,
    pivot_point: Vec<CurveValue>,
    tenor_start: Vec<CurveValue>,
    tenor_end: Vec<CurveValue>,
}

impl CurveScenario {
    /// Scenario leaving every curve unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parallel shift in basis points.
    pub fn parallel_shift(mut self, curve_code: impl Into<String>, shift_bp: f64) -> Self {
        self.adjustments.entry(curve_code.into()).or_default().parallel_shift_bp = Some(shift_bp);
        self
    }

    /// Adds a rotation.
    pub fn rotation(mut self, curve_code: impl Into<String>, rotation: CurveRotation) -> Self {
        self.adjustments.entry(curve_code.into()).or_default().rotation = Some(rotation);
        self
    }

    /// Adjustment for `curve_code`; identity when none is set.
    pub fn adjustment(&self, curve_code: &str) -> CurveAdjustment {
        self.adjustments.get(curve_code).copied().unwrap_or_default()
    }

    /// Curve codes with an adjustment.
    pub fn curve_codes(&self) -> impl Iterator<Item = &str> {
        self.adjustments.keys().map(String::as_str)
    }

    /// Parses the curve-adjustment subset of the context schema.
    ///
    /// # Errors
    /// `Parse` for malformed TOML or scoped-only keys such as
    /// `pricing_date`; `MissingField` for a rotation without a pivot.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ScenarioConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self {
            adjustments: curve_adjustments(
                &raw.parallel_shift,
                &raw.curve_shift,
                &raw.pivot_point,
                &raw.tenor_start,
                &raw.tenor_end,
            )?,
        })
    }

    /// Reads a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
