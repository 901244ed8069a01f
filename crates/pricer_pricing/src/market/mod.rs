//! Market-data interface consumed by the pricers.
//!
//! Pricers never talk to a database. Every quote they need is fetched
//! through [`MarketDataProvider`], a bank of nine lookups keyed by symbol or
//! curve code and an [`AsOf`] date. [`InMemoryMarketData`] implements the
//! trait over a JSON fixture so that pricing can run offline; production
//! deployments wrap their own store behind the same trait.
//!
//! Raw payloads keep the column layout of the upstream tables (rates and
//! volatilities in percent, swap points in pips). The [`builders`] module
//! turns them into curves and surfaces.

pub mod builders;
mod memory;

pub use builders::{
    bond_yield_zero_curve, fx_forward_curve, fx_vol_surface, historical_volatility, irs_zero_curve,
    shibor_zero_curve, Tenor,
};
pub use memory::InMemoryMarketData;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pricer_core::types::{Date, PricingError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date a lookup is made for.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_pricing::market::AsOf;
///
/// assert_eq!("latest".parse::<AsOf>().unwrap(), AsOf::Latest);
/// let d: AsOf = "2021-12-27".parse().unwrap();
/// assert_eq!(d, AsOf::Date(Date::from_ymd(2021, 12, 27).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AsOf {
    /// A civil date.
    Date(Date),
    /// Most recent data available.
    #[default]
    Latest,
}

impl AsOf {
    /// The civil date, resolving `Latest` to today.
    pub fn date(&self) -> Date {
        match self {
            AsOf::Date(d) => *d,
            AsOf::Latest => Date::today(),
        }
    }
}

impl From<Date> for AsOf {
    fn from(date: Date) -> Self {
        AsOf::Date(date)
    }
}

impl FromStr for AsOf {
    type Err = MarketDataFetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(AsOf::Latest);
        }
        Date::parse(s)
            .map(AsOf::Date)
            .map_err(|e| MarketDataFetchError::InvalidRequest(format!("as-of date {s:?}: {e}")))
    }
}

impl fmt::Display for AsOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsOf::Date(d) => write!(f, "{d}"),
            AsOf::Latest => f.write_str("latest"),
        }
    }
}

impl Serialize for AsOf {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AsOf {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Failure of a market-data lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataFetchError {
    /// No data for the key on or before the requested date.
    #[error("market data not found: {0}")]
    NotFound(String),

    /// Malformed key, range or payload.
    #[error("invalid market-data request: {0}")]
    InvalidRequest(String),
}

impl From<MarketDataFetchError> for PricingError {
    fn from(err: MarketDataFetchError) -> Self {
        PricingError::InvalidMarketData(err.to_string())
    }
}

/// Bond yield curve snapshot; rates in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BondYieldCurve {
    /// Tenors in years.
    pub tenor: Vec<f64>,
    /// Annually compounded spot rates.
    pub spot_rate: Vec<f64>,
    /// Par yields.
    #[serde(default)]
    pub ytm: Vec<f64>,
}

/// SHIBOR fixings; rates in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShiborCurve {
    /// Tenors in years.
    pub tenor: Vec<f64>,
    /// Quoted tenor labels (`O/N`, `1W`, `3M`).
    pub origin_tenor: Vec<String>,
    /// Simple money-market rates.
    pub rate: Vec<f64>,
}

/// FX swap points by tenor, in pips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwapPointCurve {
    /// Quoted tenor labels.
    pub origin_tenor: Vec<String>,
    /// Forward minus spot, in pips.
    pub swap_point: Vec<f64>,
}

/// Interest-rate swap fixings; rates in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IrsCurve {
    /// Tenors in years.
    pub tenor: Vec<f64>,
    /// Quoted tenor labels.
    pub origin_tenor: Vec<String>,
    /// Average par rate across contributors.
    pub average: Vec<f64>,
}

/// Quote type on an FX volatility surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FxVolType {
    /// At-the-money volatility.
    #[serde(rename = "ATM")]
    Atm,
    /// 25-delta risk reversal.
    #[serde(rename = "25D RR")]
    Rr25,
    /// 25-delta butterfly.
    #[serde(rename = "25D BF")]
    Bf25,
    /// 10-delta risk reversal.
    #[serde(rename = "10D RR")]
    Rr10,
    /// 10-delta butterfly.
    #[serde(rename = "10D BF")]
    Bf10,
}

impl FxVolType {
    /// All five quote types.
    pub const ALL: [FxVolType; 5] = [
        FxVolType::Atm,
        FxVolType::Rr25,
        FxVolType::Bf25,
        FxVolType::Rr10,
        FxVolType::Bf10,
    ];
}

/// Volatility term structure of one quote type; volatilities in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolCurve {
    /// Quoted tenor labels.
    pub tenor: Vec<String>,
    /// Volatility quotes.
    pub volatility: Vec<f64>,
}

/// Per-type volatility curves of one currency pair.
pub type FxVolCurves = BTreeMap<FxVolType, VolCurve>;

/// Dated observations in ascending order.
pub type TimeSeries = Vec<(Date, f64)>;

/// Source of market data.
///
/// Implementations must be cheap to query repeatedly; the pricers do not
/// cache fetched payloads between calls.
pub trait MarketDataProvider {
    /// Bond yield curve by curve code, e.g. `CBD100311`.
    fn bond_yield_curve(&self, curve_code: &str, as_of: AsOf) -> Result<BondYieldCurve, MarketDataFetchError>;

    /// SHIBOR fixings.
    fn shibor_curve(&self, as_of: AsOf) -> Result<ShiborCurve, MarketDataFetchError>;

    /// FX swap points of a pair, e.g. `USDCNY`.
    fn swap_curve(&self, symbol: &str, as_of: AsOf) -> Result<SwapPointCurve, MarketDataFetchError>;

    /// Swap fixings by curve type, e.g. `FR007`.
    fn irs_curve(&self, curve_type: &str, as_of: AsOf) -> Result<IrsCurve, MarketDataFetchError>;

    /// FX implied volatility curves of the requested types.
    fn fx_implied_volatility_curve(
        &self,
        symbol: &str,
        volatility_types: &[FxVolType],
        as_of: AsOf,
    ) -> Result<FxVolCurves, MarketDataFetchError>;

    /// Stock close.
    fn stock_price(&self, symbol: &str, as_of: AsOf) -> Result<f64, MarketDataFetchError>;

    /// FX rate of a pair.
    fn exchange_rate(&self, symbol: &str, as_of: AsOf) -> Result<f64, MarketDataFetchError>;

    /// Stock closes in `[start, end]`.
    fn historical_stock_price(&self, symbol: &str, start: Date, end: Date)
        -> Result<TimeSeries, MarketDataFetchError>;

    /// FX rates in `[start, end]`.
    fn historical_exchange_rate(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
    ) -> Result<TimeSeries, MarketDataFetchError>;
}
