//! TOML configuration of pricing contexts.

use std::collections::BTreeMap;
use std::path::Path;

use pricer_core::market_data::{CurveAdjustment, CurveRotation};
use serde::{Deserialize, Serialize};

use super::{ContextLayer, MarketObject, PricingContext};
use crate::error::ConfigError;
use crate::market::{AsOf, BondYieldCurve};

const DEFAULT_TENOR_START: f64 = 0.0;
const DEFAULT_TENOR_END: f64 = 50.0;

/// `{ symbol, value }` entry of a per-symbol override list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolValue {
    /// Instrument symbol, asset id or combined symbol.
    #[serde(alias = "asset_id", alias = "comb_symbol")]
    pub symbol: String,
    /// Override value.
    pub value: f64,
}

/// `{ curve_code, value }` entry of a curve adjustment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveValue {
    /// Curve code, e.g. `CBD100311`.
    pub curve_code: String,
    /// Shift in basis points or tenor in years, depending on the list.
    pub value: f64,
}

/// Yield curve override for one bond; rates in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolCurve {
    /// Bond symbol.
    pub bond_symbol: String,
    /// Tenors in years.
    pub tenor: Vec<f64>,
    /// Spot rates.
    pub rate: Vec<f64>,
}

/// Every option a pricing context recognises.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_pricing::context::{ContextConfig, MarketObject};
/// use pricer_pricing::market::AsOf;
///
/// let config = ContextConfig::from_toml_str(r#"
///     pricing_date = "2021-12-27"
///     clean_price = [{ symbol = "200007.IB", value = 99.1455 }]
///     parallel_shift = [{ curve_code = "CBD100311", value = 10.0 }]
/// "#).unwrap();
/// let ctx = config.into_context().unwrap();
/// assert_eq!(ctx.pricing_date(), AsOf::Date(Date::from_ymd(2021, 12, 27).unwrap()));
/// assert_eq!(ctx.value(MarketObject::CleanPrice, "200007.IB"), Some(99.1455));
/// assert_eq!(ctx.curve_adjustment("CBD100311").parallel_shift_bp, Some(10.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// `latest` or `YYYY-MM-DD`.
    pub pricing_date: Option<AsOf>,
    /// Spot overrides.
    pub spot: Vec<SymbolValue>,
    /// Volatility overrides.
    pub volatility: Vec<SymbolValue>,
    /// Clean price overrides.
    pub clean_price: Vec<SymbolValue>,
    /// Yield overrides.
    pub ytm: Vec<SymbolValue>,
    /// Dividend yield overrides.
    pub dividend_yield: Vec<SymbolValue>,
    /// Per-bond yield curves.
    pub bond_yield_curve: Vec<SymbolCurve>,
    /// Parallel shifts in basis points.
    pub parallel_shift: Vec<CurveValue>,
    /// Rotation sizes in basis points.
    pub curve_shift: Vec<CurveValue>,
    /// Rotation pivots in years.
    pub pivot_point: Vec<CurveValue>,
    /// Rotation range starts in years.
    pub tenor_start: Vec<CurveValue>,
    /// Rotation range ends in years.
    pub tenor_end: Vec<CurveValue>,
}

fn by_code(values: &[CurveValue]) -> BTreeMap<&str, f64> {
    values.iter().map(|v| (v.curve_code.as_str(), v.value)).collect()
}

/// Assembles per-curve adjustments from the flat option lists.
pub(super) fn curve_adjustments(
    parallel_shift: &[CurveValue],
    curve_shift: &[CurveValue],
    pivot_point: &[CurveValue],
    tenor_start: &[CurveValue],
    tenor_end: &[CurveValue],
) -> Result<BTreeMap<String, CurveAdjustment>, ConfigError> {
    let mut out: BTreeMap<String, CurveAdjustment> = BTreeMap::new();
    for v in parallel_shift {
        out.entry(v.curve_code.clone()).or_default().parallel_shift_bp = Some(v.value);
    }
    let shifts = by_code(curve_shift);
    let pivots = by_code(pivot_point);
    let starts = by_code(tenor_start);
    let ends = by_code(tenor_end);
    for (code, _) in pivots.iter().chain(&starts).chain(&ends) {
        if !shifts.contains_key(code) {
            return Err(ConfigError::MissingField {
                field: "curve_shift",
                key: (*code).to_string(),
            });
        }
    }
    for (code, shift_bp) in shifts {
        let pivot = *pivots.get(code).ok_or_else(|| ConfigError::MissingField {
            field: "pivot_point",
            key: code.to_string(),
        })?;
        let start = starts.get(code).copied().unwrap_or(DEFAULT_TENOR_START);
        let end = ends.get(code).copied().unwrap_or(DEFAULT_TENOR_END);
        if !(end > start) {
            return Err(ConfigError::InvalidParameter {
                name: "tenor_end",
                value: format!("{code}: [{start}, {end}] is empty"),
            });
        }
        out.entry(code.to_string()).or_default().rotation = Some(CurveRotation {
            pivot,
            start,
            end,
            shift_bp,
        });
    }
    Ok(out)
}

impl ContextConfig {
    /// Parses TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Converts into a context layer.
    ///
    /// # Errors
    /// `MissingField` for rotation lists without a pivot or a size;
    /// `InvalidParameter` for mismatched bond curve columns.
    pub fn into_layer(self) -> Result<ContextLayer, ConfigError> {
        let mut layer = ContextLayer::new();
        if let Some(date) = self.pricing_date {
            layer = layer.pricing_date(date);
        }
        let lists = [
            (MarketObject::Spot, &self.spot),
            (MarketObject::Volatility, &self.volatility),
            (MarketObject::CleanPrice, &self.clean_price),
            (MarketObject::Ytm, &self.ytm),
            (MarketObject::DividendYield, &self.dividend_yield),
        ];
        for (object, list) in lists {
            for entry in list {
                layer = layer.value(object, entry.symbol.clone(), entry.value);
            }
        }
        for curve in self.bond_yield_curve {
            if curve.tenor.len() != curve.rate.len() {
                return Err(ConfigError::InvalidParameter {
                    name: "bond_yield_curve",
                    value: format!(
                        "{}: {} tenors but {} rates",
                        curve.bond_symbol,
                        curve.tenor.len(),
                        curve.rate.len()
                    ),
                });
            }
            layer = layer.bond_yield_curve(
                curve.bond_symbol,
                BondYieldCurve {
                    tenor: curve.tenor,
                    spot_rate: curve.rate,
                    ytm: Vec::new(),
                },
            );
        }
        let adjustments = curve_adjustments(
            &self.parallel_shift,
            &self.curve_shift,
            &self.pivot_point,
            &self.tenor_start,
            &self.tenor_end,
        )?;
        for (code, adj) in adjustments {
            layer = layer.curve_adjustment(code, adj);
        }
        Ok(layer)
    }

    /// A context with this configuration as its only layer.
    pub fn into_context(self) -> Result<PricingContext, ConfigError> {
        let mut ctx = PricingContext::new();
        ctx.enter(self.into_layer()?);
        Ok(ctx)
    }
}
