//! In-memory market data loaded from JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use pricer_core::types::Date;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    AsOf, BondYieldCurve, FxVolCurves, FxVolType, IrsCurve, MarketDataFetchError, MarketDataProvider, ShiborCurve,
    SwapPointCurve, TimeSeries,
};

type Dated<T> = BTreeMap<Date, T>;

/// Market data held in ordered maps keyed by symbol, then date.
///
/// A dated lookup with no entry on the requested date falls back to the
/// most recent entry before it and logs a warning; `AsOf::Latest` takes
/// the last entry.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_pricing::market::{AsOf, InMemoryMarketData, MarketDataProvider};
///
/// let d = Date::from_ymd(2021, 8, 13).unwrap();
/// let data = InMemoryMarketData::new().with_stock_price("600000.SH", d, 5.262);
/// assert_eq!(data.stock_price("600000.SH", AsOf::Date(d)).unwrap(), 5.262);
/// assert_eq!(data.stock_price("600000.SH", AsOf::Latest).unwrap(), 5.262);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryMarketData {
    bond_yield_curves: BTreeMap<String, Dated<BondYieldCurve>>,
    shibor: Dated<ShiborCurve>,
    swap_points: BTreeMap<String, Dated<SwapPointCurve>>,
    irs: BTreeMap<String, Dated<IrsCurve>>,
    fx_volatility: BTreeMap<String, Dated<FxVolCurves>>,
    stock_prices: BTreeMap<String, Dated<f64>>,
    exchange_rates: BTreeMap<String, Dated<f64>>,
}

fn lookup<'a, T>(series: Option<&'a Dated<T>>, what: &str, as_of: AsOf) -> Result<&'a T, MarketDataFetchError> {
    let series = series.ok_or_else(|| MarketDataFetchError::NotFound(what.to_string()))?;
    match as_of {
        AsOf::Latest => series
            .values()
            .next_back()
            .ok_or_else(|| MarketDataFetchError::NotFound(format!("{what} (latest)"))),
        AsOf::Date(date) => {
            if let Some(v) = series.get(&date) {
                return Ok(v);
            }
            let (found, v) = series
                .range(..date)
                .next_back()
                .ok_or_else(|| MarketDataFetchError::NotFound(format!("{what} on or before {date}")))?;
            warn!(what, requested = %date, used = %found, "market data missing, falling back to latest prior");
            Ok(v)
        }
    }
}

fn range(series: Option<&Dated<f64>>, what: &str, start: Date, end: Date) -> Result<TimeSeries, MarketDataFetchError> {
    if end < start {
        return Err(MarketDataFetchError::InvalidRequest(format!("{what}: range {start}..{end} is inverted")));
    }
    let series = series.ok_or_else(|| MarketDataFetchError::NotFound(what.to_string()))?;
    Ok(series.range(start..=end).map(|(d, v)| (*d, *v)).collect())
}

impl InMemoryMarketData {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    /// `InvalidRequest` with the parser message for malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataFetchError> {
        serde_json::from_str(json).map_err(|e| MarketDataFetchError::InvalidRequest(format!("market data json: {e}")))
    }

    /// Reads and parses a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MarketDataFetchError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MarketDataFetchError::InvalidRequest(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Serialises the store.
    pub fn to_json_string(&self) -> Result<String, MarketDataFetchError> {
        serde_json::to_string_pretty(self).map_err(|e| MarketDataFetchError::InvalidRequest(e.to_string()))
    }

    /// Adds a bond yield curve.
    pub fn with_bond_yield_curve(mut self, code: impl Into<String>, date: Date, curve: BondYieldCurve) -> Self {
        self.bond_yield_curves.entry(code.into()).or_default().insert(date, curve);
        self
    }

    /// Adds SHIBOR fixings.
    pub fn with_shibor_curve(mut self, date: Date, curve: ShiborCurve) -> Self {
        self.shibor.insert(date, curve);
        self
    }

    /// Adds FX swap points.
    pub fn with_swap_curve(mut self, symbol: impl Into<String>, date: Date, curve: SwapPointCurve) -> Self {
        self.swap_points.entry(symbol.into()).or_default().insert(date, curve);
        self
    }

    /// Adds swap fixings.
    pub fn with_irs_curve(mut self, curve_type: impl Into<String>, date: Date, curve: IrsCurve) -> Self {
        self.irs.entry(curve_type.into()).or_default().insert(date, curve);
        self
    }

    /// Adds FX volatility curves.
    pub fn with_fx_volatility(mut self, symbol: impl Into<String>, date: Date, curves: FxVolCurves) -> Self {
        self.fx_volatility.entry(symbol.into()).or_default().insert(date, curves);
        self
    }

    /// Adds a stock close.
    pub fn with_stock_price(mut self, symbol: impl Into<String>, date: Date, price: f64) -> Self {
        self.stock_prices.entry(symbol.into()).or_default().insert(date, price);
        self
    }

    /// Adds an FX rate.
    pub fn with_exchange_rate(mut self, symbol: impl Into<String>, date: Date, rate: f64) -> Self {
        self.exchange_rates.entry(symbol.into()).or_default().insert(date, rate);
        self
    }
}

impl MarketDataProvider for InMemoryMarketData {
    fn bond_yield_curve(&self, curve_code: &str, as_of: AsOf) -> Result<BondYieldCurve, MarketDataFetchError> {
        let what = format!("bond yield curve {curve_code}");
        lookup(self.bond_yield_curves.get(curve_code), &what, as_of).cloned()
    }

    fn shibor_curve(&self, as_of: AsOf) -> Result<ShiborCurve, MarketDataFetchError> {
        lookup(Some(&self.shibor), "shibor curve", as_of).cloned()
    }

    fn swap_curve(&self, symbol: &str, as_of: AsOf) -> Result<SwapPointCurve, MarketDataFetchError> {
        let what = format!("swap points {symbol}");
        lookup(self.swap_points.get(symbol), &what, as_of).cloned()
    }

    fn irs_curve(&self, curve_type: &str, as_of: AsOf) -> Result<IrsCurve, MarketDataFetchError> {
        let what = format!("irs curve {curve_type}");
        lookup(self.irs.get(curve_type), &what, as_of).cloned()
    }

    fn fx_implied_volatility_curve(
        &self,
        symbol: &str,
        volatility_types: &[FxVolType],
        as_of: AsOf,
    ) -> Result<FxVolCurves, MarketDataFetchError> {
        let what = format!("fx volatility {symbol}");
        let all = lookup(self.fx_volatility.get(symbol), &what, as_of)?;
        volatility_types
            .iter()
            .map(|t| {
                all.get(t)
                    .cloned()
                    .map(|c| (*t, c))
                    .ok_or_else(|| MarketDataFetchError::NotFound(format!("{what} {t:?}")))
            })
            .collect()
    }

    fn stock_price(&self, symbol: &str, as_of: AsOf) -> Result<f64, MarketDataFetchError> {
        let what = format!("stock price {symbol}");
        lookup(self.stock_prices.get(symbol), &what, as_of).copied()
    }

    fn exchange_rate(&self, symbol: &str, as_of: AsOf) -> Result<f64, MarketDataFetchError> {
        let what = format!("exchange rate {symbol}");
        lookup(self.exchange_rates.get(symbol), &what, as_of).copied()
    }

    fn historical_stock_price(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
    ) -> Result<TimeSeries, MarketDataFetchError> {
        range(self.stock_prices.get(symbol), &format!("stock price {symbol}"), start, end)
    }

    fn historical_exchange_rate(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
    ) -> Result<TimeSeries, MarketDataFetchError> {
        range(self.exchange_rates.get(symbol), &format!("exchange rate {symbol}"), start, end)
    }
}
