//! Market-data handles carried by instruments.
//!
//! An instrument names the market objects it depends on (an underlying
//! symbol, a discount curve) and may pin any of them explicitly. Pinned
//! values win over pricing-context overrides, which win over fetched data.

use std::fmt;

/// Market inputs pinned on the instrument itself.
///
/// # Examples
/// ```
/// use pricer_models::instruments::MarketAttributes;
///
/// let attrs = MarketAttributes::default().with_spot(5.262).with_volatility(0.1);
/// assert_eq!(attrs.spot, Some(5.262));
/// assert!(attrs.clean_price.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketAttributes {
    /// Underlying spot or FX rate.
    pub spot: Option<f64>,
    /// Flat volatility.
    pub volatility: Option<f64>,
    /// Bond clean price per 100.
    pub clean_price: Option<f64>,
    /// Bond yield to maturity.
    pub ytm: Option<f64>,
}

impl MarketAttributes {
    /// Pins the spot.
    pub fn with_spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Pins the volatility.
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Pins the clean price.
    pub fn with_clean_price(mut self, price: f64) -> Self {
        self.clean_price = Some(price);
        self
    }

    /// Pins the yield.
    pub fn with_ytm(mut self, ytm: f64) -> Self {
        self.ytm = Some(ytm);
        self
    }
}

/// Source of a discount curve.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveRef {
    /// Bond yield curve by code, e.g. `CBD100311`.
    BondYield(String),
    /// SHIBOR money-market curve.
    #[default]
    Shibor,
    /// Swap curve bootstrapped from IRS quotes of the given type.
    Irs(String),
    /// Flat continuously compounded rate.
    Flat(f64),
}

impl CurveRef {
    /// Key under which scenario adjustments address the curve.
    pub fn code(&self) -> String {
        match self {
            CurveRef::BondYield(code) | CurveRef::Irs(code) => code.clone(),
            CurveRef::Shibor => "SHIBOR".to_string(),
            CurveRef::Flat(_) => "FLAT".to_string(),
        }
    }
}

impl fmt::Display for CurveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveRef::Flat(r) => write!(f, "FLAT({r})"),
            other => f.write_str(&other.code()),
        }
    }
}

/// Asset class of an instrument; selects which attribute a greek bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssetClass {
    /// Equity and index options.
    Equity,
    /// FX options and forwards.
    Fx,
    /// Bonds and bond options.
    Bond,
}

impl AssetClass {
    /// Prefix used in greek names (`eq_delta`, `fx_vega`, `bond_dv01`).
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetClass::Equity => "eq",
            AssetClass::Fx => "fx",
            AssetClass::Bond => "bond",
        }
    }
}
