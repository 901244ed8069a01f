//! Knot-based zero-rate discount curve.

use super::{Compounding, YieldCurve};
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{Interpolator, PchipInterpolator};
use crate::types::{Date, DayCountConvention};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How a [`ZeroCurve`] fills the space between knots.
///
/// Before the first knot every method holds the first zero rate flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveInterpolation {
    /// Linear in log df (piecewise-constant forwards); last forward extrapolated.
    #[default]
    FlatForward,
    /// Linear in the zero rate; flat beyond the last knot.
    LinearZero,
    /// Linear in log df; zero rate held flat beyond the last knot.
    LogLinearDiscount,
    /// Fritsch-Carlson monotone cubic on log df; flat zero beyond the last knot.
    PchipLogDiscount,
}

impl CurveInterpolation {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            CurveInterpolation::FlatForward => "flat_forward",
            CurveInterpolation::LinearZero => "linear_zero",
            CurveInterpolation::LogLinearDiscount => "log_linear_discount",
            CurveInterpolation::PchipLogDiscount => "pchip_log_discount",
        }
    }
}

impl fmt::Display for CurveInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveInterpolation {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "flat_forward" | "flatforward" => Ok(CurveInterpolation::FlatForward),
            "linear_zero" | "linear" => Ok(CurveInterpolation::LinearZero),
            "log_linear_discount" | "log_linear" | "loglinear" => {
                Ok(CurveInterpolation::LogLinearDiscount)
            }
            "pchip_log_discount" | "pchip" => Ok(CurveInterpolation::PchipLogDiscount),
            other => Err(MarketDataError::InvalidInput(format!(
                "unknown curve interpolation: {other}"
            ))),
        }
    }
}

/// Discount curve defined by zero rates at knot tenors.
///
/// Rates are quoted under the curve's [`Compounding`]; tenors are year
/// fractions from the anchor. The curve is immutable: [`bump`](Self::bump)
/// returns a new curve sharing the tenor array.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::{Compounding, CurveInterpolation, YieldCurve, ZeroCurve};
/// use pricer_core::types::Date;
///
/// let anchor = Date::from_ymd(2021, 12, 27).unwrap();
/// let curve = ZeroCurve::new(
///     anchor,
///     &[0.5, 1.0, 5.0],
///     &[0.020, 0.022, 0.028],
///     Compounding::Continuous,
///     CurveInterpolation::FlatForward,
/// )
/// .unwrap();
///
/// assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
/// let z = curve.zero_rate(1.0, Compounding::Continuous).unwrap();
/// assert!((z - 0.022).abs() < 1e-14);
///
/// let shifted = curve.bump(0.0001).unwrap();
/// assert!(shifted.discount_factor(5.0).unwrap() < curve.discount_factor(5.0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    anchor: Date,
    day_count: DayCountConvention,
    tenors: Arc<[f64]>,
    rates: Vec<f64>,
    compounding: Compounding,
    interpolation: CurveInterpolation,
    log_dfs: Vec<f64>,
    pchip: Option<PchipInterpolator<f64>>,
}

impl ZeroCurve {
    /// Build a curve from knot tenors (years, strictly increasing, positive)
    /// and zero rates under `compounding`.
    pub fn new(
        anchor: Date,
        tenors: &[f64],
        rates: &[f64],
        compounding: Compounding,
        interpolation: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        Self::from_shared(
            anchor,
            DayCountConvention::Actual365Fixed,
            Arc::from(tenors),
            rates.to_vec(),
            compounding,
            interpolation,
        )
    }

    /// Build a curve from knot dates; tenors are ACT/365F fractions from `anchor`.
    pub fn from_dates(
        anchor: Date,
        dates: &[Date],
        rates: &[f64],
        compounding: Compounding,
        interpolation: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        let tenors: Vec<f64> = dates
            .iter()
            .map(|d| DayCountConvention::Actual365Fixed.year_frac(anchor, *d).fraction)
            .collect();
        Self::new(anchor, &tenors, rates, compounding, interpolation)
    }

    /// Build a curve from knot discount factors; rates are stored continuously compounded.
    pub fn from_discount_factors(
        anchor: Date,
        tenors: &[f64],
        dfs: &[f64],
        interpolation: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        if let Some(bad) = dfs.iter().find(|df| !(**df > 0.0) || !df.is_finite()) {
            return Err(MarketDataError::InvalidInput(format!(
                "discount factor must be positive, got {bad}"
            )));
        }
        if tenors.len() != dfs.len() {
            return Err(MarketDataError::InvalidInput(format!(
                "tenors and discount factors differ in length: {} vs {}",
                tenors.len(),
                dfs.len()
            )));
        }
        let rates: Vec<f64> = tenors
            .iter()
            .zip(dfs)
            .map(|(t, df)| -df.ln() / t)
            .collect();
        Self::new(anchor, tenors, &rates, Compounding::Continuous, interpolation)
    }

    /// Single-rate curve.
    pub fn flat(anchor: Date, rate: f64, compounding: Compounding) -> Result<Self, MarketDataError> {
        Self::new(anchor, &[1.0], &[rate], compounding, CurveInterpolation::FlatForward)
    }

    /// Replace the convention mapping dates to curve time.
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    fn from_shared(
        anchor: Date,
        day_count: DayCountConvention,
        tenors: Arc<[f64]>,
        rates: Vec<f64>,
        compounding: Compounding,
        interpolation: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        if tenors.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        if tenors.len() != rates.len() {
            return Err(MarketDataError::InvalidInput(format!(
                "tenors and rates differ in length: {} vs {}",
                tenors.len(),
                rates.len()
            )));
        }
        for (i, &t) in tenors.iter().enumerate() {
            if !(t > 0.0) || !t.is_finite() || (i > 0 && t <= tenors[i - 1]) {
                return Err(MarketDataError::InvalidMaturity { t });
            }
        }

        let mut log_dfs = Vec::with_capacity(rates.len());
        for (&t, &r) in tenors.iter().zip(&rates) {
            let df = compounding.discount_factor(r, t);
            if !r.is_finite() || !(df > 0.0) || !df.is_finite() {
                return Err(MarketDataError::InvalidInput(format!(
                    "rate {r} at tenor {t} gives no positive discount factor"
                )));
            }
            log_dfs.push(df.ln());
        }

        let pchip = match interpolation {
            CurveInterpolation::PchipLogDiscount if tenors.len() >= 2 => {
                Some(PchipInterpolator::new(&tenors, &log_dfs)?)
            }
            _ => None,
        };

        Ok(Self {
            anchor,
            day_count,
            tenors,
            rates,
            compounding,
            interpolation,
            log_dfs,
            pchip,
        })
    }

    /// Knot tenors in years.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Knot zero rates under [`compounding`](Self::compounding).
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Quoting compounding of the knot rates.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// Interpolation method.
    pub fn interpolation(&self) -> CurveInterpolation {
        self.interpolation
    }

    /// Number of knots.
    pub fn len(&self) -> usize {
        self.tenors.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.tenors.is_empty()
    }

    /// New curve with every knot rate shifted by `delta` (decimal).
    pub fn bump(&self, delta: f64) -> Result<ZeroCurve, MarketDataError> {
        self.with_rates(self.rates.iter().map(|r| r + delta).collect())
    }

    /// New curve on the same tenors with replacement rates.
    pub fn with_rates(&self, rates: Vec<f64>) -> Result<ZeroCurve, MarketDataError> {
        Self::from_shared(
            self.anchor,
            self.day_count,
            Arc::clone(&self.tenors),
            rates,
            self.compounding,
            self.interpolation,
        )
    }

    /// New curve on new knots, keeping anchor, conventions and interpolation.
    pub fn with_knots(&self, tenors: &[f64], rates: &[f64]) -> Result<ZeroCurve, MarketDataError> {
        Self::from_shared(
            self.anchor,
            self.day_count,
            Arc::from(tenors),
            rates.to_vec(),
            self.compounding,
            self.interpolation,
        )
    }

    /// Zero rate at `t` under the curve's own compounding.
    pub fn native_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        if t <= self.tenors[0] {
            return Ok(self.rates[0]);
        }
        self.zero_rate(t, self.compounding)
    }

    fn flat_zero_df(&self, rate: f64, t: f64) -> f64 {
        self.compounding.discount_factor(rate, t)
    }

    fn log_linear(&self, t: f64) -> f64 {
        let i = self.tenors.partition_point(|&x| x <= t).saturating_sub(1).min(self.tenors.len() - 2);
        let (t0, t1) = (self.tenors[i], self.tenors[i + 1]);
        let (l0, l1) = (self.log_dfs[i], self.log_dfs[i + 1]);
        (l0 + (l1 - l0) * (t - t0) / (t1 - t0)).exp()
    }
}

impl YieldCurve for ZeroCurve {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if t.is_nan() || t < 0.0 {
            return Err(MarketDataError::InvalidMaturity { t });
        }
        if t == 0.0 {
            return Ok(1.0);
        }
        let n = self.tenors.len();
        let first = self.tenors[0];
        let last = self.tenors[n - 1];

        if n == 1 || t <= first {
            return Ok(self.flat_zero_df(self.rates[0], t));
        }

        if t > last {
            return Ok(match self.interpolation {
                CurveInterpolation::FlatForward => {
                    let slope = (self.log_dfs[n - 1] - self.log_dfs[n - 2])
                        / (self.tenors[n - 1] - self.tenors[n - 2]);
                    (self.log_dfs[n - 1] + slope * (t - last)).exp()
                }
                _ => self.flat_zero_df(self.rates[n - 1], t),
            });
        }

        match self.interpolation {
            CurveInterpolation::FlatForward | CurveInterpolation::LogLinearDiscount => {
                Ok(self.log_linear(t))
            }
            CurveInterpolation::LinearZero => {
                let i = self.tenors.partition_point(|&x| x <= t).saturating_sub(1).min(n - 2);
                let w = (t - self.tenors[i]) / (self.tenors[i + 1] - self.tenors[i]);
                let r = self.rates[i] + (self.rates[i + 1] - self.rates[i]) * w;
                Ok(self.flat_zero_df(r, t))
            }
            CurveInterpolation::PchipLogDiscount => match &self.pchip {
                Some(p) => Ok(p.interpolate(t)?.exp()),
                None => Ok(self.log_linear(t)),
            },
        }
    }

    fn anchor(&self) -> Date {
        self.anchor
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }
}
