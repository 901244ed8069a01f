//! Yield curve trait and compounding conventions.

use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};
use std::fmt;
use std::str::FromStr;

/// Interest-rate compounding convention.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::Compounding;
///
/// let df = Compounding::Periodic(2).discount_factor(0.04, 1.0);
/// assert!((df - 1.0 / 1.02f64.powi(2)).abs() < 1e-15);
/// let r = Compounding::Periodic(2).rate_from_discount_factor(df, 1.0);
/// assert!((r - 0.04).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    /// `df = exp(-r t)`
    #[default]
    Continuous,
    /// `df = 1 / (1 + r t)`
    Simple,
    /// `df = (1 + r/f)^(-f t)`
    Periodic(u32),
}

impl Compounding {
    /// Discount factor for rate `r` over `t` years.
    pub fn discount_factor(&self, r: f64, t: f64) -> f64 {
        match *self {
            Compounding::Continuous => (-r * t).exp(),
            Compounding::Simple => 1.0 / (1.0 + r * t),
            Compounding::Periodic(0) => (-r * t).exp(),
            Compounding::Periodic(f) => {
                let f = f as f64;
                (1.0 + r / f).powf(-f * t)
            }
        }
    }

    /// Rate that reproduces discount factor `df` over `t > 0` years.
    pub fn rate_from_discount_factor(&self, df: f64, t: f64) -> f64 {
        match *self {
            Compounding::Continuous | Compounding::Periodic(0) => -df.ln() / t,
            Compounding::Simple => (1.0 / df - 1.0) / t,
            Compounding::Periodic(f) => {
                let f = f as f64;
                f * (df.powf(-1.0 / (f * t)) - 1.0)
            }
        }
    }

    /// Short name (`"continuous"`, `"simple"`, `"periodic-2"`).
    pub fn name(&self) -> String {
        match self {
            Compounding::Continuous => "continuous".to_string(),
            Compounding::Simple => "simple".to_string(),
            Compounding::Periodic(f) => format!("periodic-{f}"),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Compounding {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "continuous" => Ok(Compounding::Continuous),
            "simple" => Ok(Compounding::Simple),
            "annual" => Ok(Compounding::Periodic(1)),
            "semiannual" | "semi-annual" => Ok(Compounding::Periodic(2)),
            "quarterly" => Ok(Compounding::Periodic(4)),
            _ => lower
                .strip_prefix("periodic-")
                .and_then(|n| n.parse().ok())
                .map(Compounding::Periodic)
                .ok_or_else(|| MarketDataError::InvalidInput(format!("unknown compounding: {s}"))),
        }
    }
}

/// A discount curve anchored at a valuation date.
///
/// Times are year fractions from [`anchor`](Self::anchor) under
/// [`day_count`](Self::day_count). Implementors supply
/// [`discount_factor`](Self::discount_factor); rates and date-based
/// lookups are derived from it.
pub trait YieldCurve {
    /// Discount factor at `t` years from the anchor.
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError>;

    /// Curve anchor (df = 1).
    fn anchor(&self) -> Date;

    /// Convention converting dates into curve time.
    fn day_count(&self) -> DayCountConvention {
        DayCountConvention::Actual365Fixed
    }

    /// Curve time of `date`.
    fn time_of(&self, date: Date) -> f64 {
        self.day_count().year_frac(self.anchor(), date).fraction
    }

    /// Zero rate to `t` under `compounding`.
    fn zero_rate(&self, t: f64, compounding: Compounding) -> Result<f64, MarketDataError> {
        if t <= 0.0 {
            return Err(MarketDataError::InvalidMaturity { t });
        }
        let df = self.discount_factor(t)?;
        Ok(compounding.rate_from_discount_factor(df, t))
    }

    /// Forward rate between `t1` and `t2 > t1` under `compounding`.
    fn forward_rate(
        &self,
        t1: f64,
        t2: f64,
        compounding: Compounding,
    ) -> Result<f64, MarketDataError> {
        let dt = t2 - t1;
        if dt <= 0.0 {
            return Err(MarketDataError::InvalidMaturity { t: dt });
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok(compounding.rate_from_discount_factor(df2 / df1, dt))
    }

    /// Discount factor at `date`.
    fn df(&self, date: Date) -> Result<f64, MarketDataError> {
        self.discount_factor(self.time_of(date))
    }

    /// Zero rate to `date`.
    fn zero_rate_on(&self, date: Date, compounding: Compounding) -> Result<f64, MarketDataError> {
        self.zero_rate(self.time_of(date), compounding)
    }

    /// Simple forward rate over the accrual period `[d1, d2]` measured in `day_count`.
    fn fwd_rate(
        &self,
        d1: Date,
        d2: Date,
        day_count: DayCountConvention,
    ) -> Result<f64, MarketDataError> {
        let tau = day_count.accrual_frac(d1, d2)?.fraction;
        if tau <= 0.0 {
            return Err(MarketDataError::InvalidMaturity { t: tau });
        }
        Ok((self.df(d1)? / self.df(d2)? - 1.0) / tau)
    }
}

impl<C: YieldCurve + ?Sized> YieldCurve for &C {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        (**self).discount_factor(t)
    }
    fn anchor(&self) -> Date {
        (**self).anchor()
    }
    fn day_count(&self) -> DayCountConvention {
        (**self).day_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct MockCurve {
        rate: f64,
    }

    impl YieldCurve for MockCurve {
        fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
            Ok((-self.rate * t).exp())
        }
        fn anchor(&self) -> Date {
            Date::from_ymd(2024, 1, 1).unwrap()
        }
    }

    #[test]
    fn test_default_zero_rate() {
        let curve = MockCurve { rate: 0.05 };
        assert_relative_eq!(
            curve.zero_rate(2.0, Compounding::Continuous).unwrap(),
            0.05,
            epsilon = 1e-14
        );
        assert!(matches!(
            curve.zero_rate(0.0, Compounding::Continuous),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
    }

    #[test]
    fn test_forward_rate_reversed() {
        let curve = MockCurve { rate: 0.05 };
        assert!(curve.forward_rate(2.0, 1.0, Compounding::Continuous).is_err());
    }

    #[test]
    fn test_simple_fwd_rate_over_dates() {
        let curve = MockCurve { rate: 0.03 };
        let d1 = Date::from_ymd(2024, 7, 1).unwrap();
        let d2 = Date::from_ymd(2025, 1, 1).unwrap();
        let fwd = curve.fwd_rate(d1, d2, DayCountConvention::Actual365Fixed).unwrap();
        let tau: f64 = 184.0 / 365.0;
        assert_relative_eq!(fwd, ((0.03 * tau).exp() - 1.0) / tau, epsilon = 1e-14);
    }

    #[test]
    fn test_compounding_parse() {
        assert_eq!("simple".parse::<Compounding>().unwrap(), Compounding::Simple);
        assert_eq!(
            "periodic-12".parse::<Compounding>().unwrap(),
            Compounding::Periodic(12)
        );
        assert!("weird".parse::<Compounding>().is_err());
    }

    #[test]
    fn test_simple_roundtrip() {
        let df = Compounding::Simple.discount_factor(0.05, 0.5);
        assert_relative_eq!(
            Compounding::Simple.rate_from_discount_factor(df, 0.5),
            0.05,
            epsilon = 1e-14
        );
    }
}
