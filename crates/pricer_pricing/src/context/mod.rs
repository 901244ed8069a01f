//! Scoped market-data overrides.
//!
//! A [`PricingContext`] is an explicit value passed to every pricing call.
//! It holds a stack of [`ContextLayer`]s: entering a layer shadows the
//! overrides below it, exiting restores them. Lookups walk the stack from
//! the top. A persistent [`CurveScenario`] sits beneath every layer.
//!
//! Resolution order for any market input is: an override on the bumped
//! instrument view, the value pinned on the instrument, the context, then
//! the market-data provider.
//!
//! # Examples
//!
//! ```
//! use pricer_pricing::context::{ContextLayer, MarketObject, PricingContext};
//!
//! let mut ctx = PricingContext::new();
//! ctx.enter(ContextLayer::new().spot("600000.SH", 5.262));
//! let inner = ctx.scoped(ContextLayer::new().spot("600000.SH", 5.5), |ctx| {
//!     ctx.value(MarketObject::Spot, "600000.SH")
//! });
//! assert_eq!(inner, Some(5.5));
//! assert_eq!(ctx.value(MarketObject::Spot, "600000.SH"), Some(5.262));
//! ctx.exit();
//! assert_eq!(ctx.value(MarketObject::Spot, "600000.SH"), None);
//! ```

mod config;
mod scenario;

pub use config::{ContextConfig, CurveValue, SymbolCurve, SymbolValue};
pub use scenario::CurveScenario;

use std::collections::HashMap;

use pricer_core::market_data::{CurveAdjustment, CurveRotation};

use crate::market::{AsOf, BondYieldCurve};

/// Scalar market inputs a context can override per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarketObject {
    /// Spot or FX rate.
    Spot,
    /// Flat volatility.
    Volatility,
    /// Bond clean price.
    CleanPrice,
    /// Bond yield to maturity.
    Ytm,
    /// Continuous dividend yield.
    DividendYield,
}

/// One scope of overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextLayer {
    pricing_date: Option<AsOf>,
    values: HashMap<(MarketObject, String), f64>,
    bond_yield_curves: HashMap<String, BondYieldCurve>,
    curve_adjustments: HashMap<String, CurveAdjustment>,
}

impl ContextLayer {
    /// Empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pricing date.
    pub fn pricing_date(mut self, date: impl Into<AsOf>) -> Self {
        self.pricing_date = Some(date.into());
        self
    }

    /// Overrides a scalar input for `symbol`.
    pub fn value(mut self, object: MarketObject, symbol: impl Into<String>, value: f64) -> Self {
        self.values.insert((object, symbol.into()), value);
        self
    }

    /// Overrides a spot.
    pub fn spot(self, symbol: impl Into<String>, value: f64) -> Self {
        self.value(MarketObject::Spot, symbol, value)
    }

    /// Overrides a volatility.
    pub fn volatility(self, symbol: impl Into<String>, value: f64) -> Self {
        self.value(MarketObject::Volatility, symbol, value)
    }

    /// Overrides a clean price.
    pub fn clean_price(self, symbol: impl Into<String>, value: f64) -> Self {
        self.value(MarketObject::CleanPrice, symbol, value)
    }

    /// Overrides a yield.
    pub fn ytm(self, symbol: impl Into<String>, value: f64) -> Self {
        self.value(MarketObject::Ytm, symbol, value)
    }

    /// Overrides a dividend yield.
    pub fn dividend_yield(self, symbol: impl Into<String>, value: f64) -> Self {
        self.value(MarketObject::DividendYield, symbol, value)
    }

    /// Replaces the yield curve a bond discounts on.
    pub fn bond_yield_curve(mut self, bond_symbol: impl Into<String>, curve: BondYieldCurve) -> Self {
        self.bond_yield_curves.insert(bond_symbol.into(), curve);
        self
    }

    /// Shifts a curve in parallel.
    pub fn parallel_shift(mut self, curve_code: impl Into<String>, shift_bp: f64) -> Self {
        let entry = self.curve_adjustments.entry(curve_code.into()).or_default();
        entry.parallel_shift_bp = Some(shift_bp);
        self
    }

    /// Rotates a curve around a pivot.
    pub fn rotation(mut self, curve_code: impl Into<String>, rotation: CurveRotation) -> Self {
        let entry = self.curve_adjustments.entry(curve_code.into()).or_default();
        entry.rotation = Some(rotation);
        self
    }

    /// Sets a full adjustment for a curve.
    pub fn curve_adjustment(mut self, curve_code: impl Into<String>, adjustment: CurveAdjustment) -> Self {
        self.curve_adjustments.insert(curve_code.into(), adjustment);
        self
    }

    /// True when the layer overrides nothing.
    pub fn is_empty(&self) -> bool {
        self.pricing_date.is_none()
            && self.values.is_empty()
            && self.bond_yield_curves.is_empty()
            && self.curve_adjustments.is_empty()
    }
}

/// Stack of override layers over a persistent curve scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingContext {
    layers: Vec<ContextLayer>,
    scenario: CurveScenario,
}

impl PricingContext {
    /// Context with no overrides; prices as of the latest data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pinned to `date`.
    pub fn at(date: impl Into<AsOf>) -> Self {
        let mut ctx = Self::new();
        ctx.enter(ContextLayer::new().pricing_date(date));
        ctx
    }

    /// Installs a persistent curve scenario.
    pub fn with_scenario(mut self, scenario: CurveScenario) -> Self {
        self.scenario = scenario;
        self
    }

    /// The persistent scenario.
    pub fn scenario(&self) -> &CurveScenario {
        &self.scenario
    }

    /// Pushes a layer.
    pub fn enter(&mut self, layer: ContextLayer) {
        self.layers.push(layer);
    }

    /// Pops the innermost layer.
    pub fn exit(&mut self) -> Option<ContextLayer> {
        self.layers.pop()
    }

    /// Runs `f` with `layer` entered, exiting afterwards.
    pub fn scoped<R>(&mut self, layer: ContextLayer, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.layers.len();
        self.enter(layer);
        let out = f(self);
        self.layers.truncate(depth);
        out
    }

    /// Number of active layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Innermost pricing date, `Latest` if none is set.
    pub fn pricing_date(&self) -> AsOf {
        self.layers
            .iter()
            .rev()
            .find_map(|l| l.pricing_date)
            .unwrap_or_default()
    }

    /// Innermost override of `object` for `symbol`.
    pub fn value(&self, object: MarketObject, symbol: &str) -> Option<f64> {
        self.layers
            .iter()
            .rev()
            .find_map(|l| l.values.get(&(object, symbol.to_string())).copied())
    }

    /// Innermost yield-curve override for a bond.
    pub fn bond_yield_curve(&self, bond_symbol: &str) -> Option<&BondYieldCurve> {
        self.layers
            .iter()
            .rev()
            .find_map(|l| l.bond_yield_curves.get(bond_symbol))
    }

    /// Adjustment in force for `curve_code`: the scenario overlaid by every
    /// layer from the outermost in.
    pub fn curve_adjustment(&self, curve_code: &str) -> CurveAdjustment {
        self.layers
            .iter()
            .filter_map(|l| l.curve_adjustments.get(curve_code))
            .fold(self.scenario.adjustment(curve_code), |acc, adj| acc.merged(adj))
    }
}
