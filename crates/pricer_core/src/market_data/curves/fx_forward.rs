//! FX forward curves built from swap points, and the implied foreign curve.

use super::{YieldCurve, ZeroCurve};
use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Interpolation of the FX forward discount factor between quoted tenors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FxForwardInterpolation {
    /// Linear in df.
    Linear,
    /// Linear in log df.
    #[default]
    LogLinear,
}

impl FxForwardInterpolation {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            FxForwardInterpolation::Linear => "linear",
            FxForwardInterpolation::LogLinear => "log_linear",
        }
    }
}

impl fmt::Display for FxForwardInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FxForwardInterpolation {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(FxForwardInterpolation::Linear),
            "log_linear" | "loglinear" | "log" => Ok(FxForwardInterpolation::LogLinear),
            other => Err(MarketDataError::InvalidInput(format!(
                "unknown fx forward interpolation: {other}"
            ))),
        }
    }
}

/// FX forward curve: `df_fwd(τ) = S₀ / (S₀ + q(τ))` for swap points `q`.
///
/// The anchor carries an implicit zero swap point, so `df_fwd(0) = 1`.
/// Beyond the last quote the implied continuously compounded rate is held flat.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::{FxForwardCurve, FxForwardInterpolation};
/// use pricer_core::types::Date;
///
/// let anchor = Date::from_ymd(2021, 8, 20).unwrap();
/// let curve = FxForwardCurve::new(
///     anchor, 6.5, &[0.25, 1.0], &[0.035, 0.14], FxForwardInterpolation::Linear,
/// ).unwrap();
/// assert!((curve.forward(1.0).unwrap() - 6.64).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FxForwardCurve {
    anchor: Date,
    spot: f64,
    tenors: Vec<f64>,
    swap_points: Vec<f64>,
    dfs: Vec<f64>,
    interpolation: FxForwardInterpolation,
}

impl FxForwardCurve {
    /// Build from spot and swap points (price units) at strictly increasing tenors.
    pub fn new(
        anchor: Date,
        spot: f64,
        tenors: &[f64],
        swap_points: &[f64],
        interpolation: FxForwardInterpolation,
    ) -> Result<Self, MarketDataError> {
        if !(spot > 0.0) || !spot.is_finite() {
            return Err(MarketDataError::InvalidSpot { spot });
        }
        if tenors.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        if tenors.len() != swap_points.len() {
            return Err(MarketDataError::InvalidInput(format!(
                "tenors and swap points differ in length: {} vs {}",
                tenors.len(),
                swap_points.len()
            )));
        }
        let mut dfs = Vec::with_capacity(tenors.len());
        for (i, (&t, &q)) in tenors.iter().zip(swap_points).enumerate() {
            if !(t > 0.0) || (i > 0 && t <= tenors[i - 1]) {
                return Err(MarketDataError::InvalidMaturity { t });
            }
            let fwd = spot + q;
            if !(fwd > 0.0) || !fwd.is_finite() {
                return Err(MarketDataError::InvalidSpot { spot: fwd });
            }
            dfs.push(spot / fwd);
        }
        Ok(Self {
            anchor,
            spot,
            tenors: tenors.to_vec(),
            swap_points: swap_points.to_vec(),
            dfs,
            interpolation,
        })
    }

    /// FX spot.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Quoted tenors.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Quoted swap points.
    pub fn swap_points(&self) -> &[f64] {
        &self.swap_points
    }

    /// Outright forward `S₀ / df_fwd(t)`.
    pub fn forward(&self, t: f64) -> Result<f64, MarketDataError> {
        Ok(self.spot / self.discount_factor(t)?)
    }

    /// Outright forward to `date`.
    pub fn forward_on(&self, date: Date) -> Result<f64, MarketDataError> {
        self.forward(self.time_of(date))
    }

    /// Same swap points re-anchored on a different spot.
    pub fn with_spot(&self, spot: f64) -> Result<Self, MarketDataError> {
        Self::new(self.anchor, spot, &self.tenors, &self.swap_points, self.interpolation)
    }
}

impl YieldCurve for FxForwardCurve {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if t.is_nan() || t < 0.0 {
            return Err(MarketDataError::InvalidMaturity { t });
        }
        if t == 0.0 {
            return Ok(1.0);
        }
        let n = self.tenors.len();
        if t >= self.tenors[n - 1] {
            let (tn, dn) = (self.tenors[n - 1], self.dfs[n - 1]);
            return Ok(dn.powf(t / tn));
        }
        let i = self.tenors.partition_point(|&x| x <= t);
        let (t0, d0) = if i == 0 {
            (0.0, 1.0)
        } else {
            (self.tenors[i - 1], self.dfs[i - 1])
        };
        let (t1, d1) = (self.tenors[i], self.dfs[i]);
        let w = (t - t0) / (t1 - t0);
        Ok(match self.interpolation {
            FxForwardInterpolation::Linear => d0 + (d1 - d0) * w,
            FxForwardInterpolation::LogLinear => (d0.ln() + (d1.ln() - d0.ln()) * w).exp(),
        })
    }

    fn anchor(&self) -> Date {
        self.anchor
    }
}

/// Foreign discount curve implied by covered interest parity:
/// `df_foreign = df_domestic / df_fwd`.
#[derive(Debug, Clone)]
pub struct FxImpliedCurve {
    domestic: Arc<ZeroCurve>,
    forward: Arc<FxForwardCurve>,
}

impl FxImpliedCurve {
    /// Combine a domestic curve with an FX forward curve on the same anchor.
    pub fn new(domestic: Arc<ZeroCurve>, forward: Arc<FxForwardCurve>) -> Result<Self, MarketDataError> {
        if domestic.anchor() != forward.anchor() {
            return Err(MarketDataError::InvalidInput(format!(
                "domestic curve anchored {} but fx forward curve anchored {}",
                domestic.anchor(),
                forward.anchor()
            )));
        }
        Ok(Self { domestic, forward })
    }

    /// Domestic curve.
    pub fn domestic(&self) -> &ZeroCurve {
        &self.domestic
    }

    /// FX forward curve.
    pub fn fx_forward(&self) -> &FxForwardCurve {
        &self.forward
    }

    /// Same construction over a bumped domestic curve.
    pub fn bump(&self, delta: f64) -> Result<Self, MarketDataError> {
        Ok(Self {
            domestic: Arc::new(self.domestic.bump(delta)?),
            forward: Arc::clone(&self.forward),
        })
    }
}

impl YieldCurve for FxImpliedCurve {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        Ok(self.domestic.discount_factor(t)? / self.forward.discount_factor(t)?)
    }

    fn anchor(&self) -> Date {
        self.domestic.anchor()
    }

    fn day_count(&self) -> DayCountConvention {
        self.domestic.day_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{Compounding, CurveInterpolation};
    use approx::assert_relative_eq;

    fn anchor() -> Date {
        Date::from_ymd(2021, 8, 20).unwrap()
    }

    fn fwd(interp: FxForwardInterpolation) -> FxForwardCurve {
        FxForwardCurve::new(anchor(), 6.5, &[0.25, 0.5, 1.0], &[0.03, 0.065, 0.13], interp).unwrap()
    }

    #[test]
    fn test_quoted_forwards() {
        let curve = fwd(FxForwardInterpolation::LogLinear);
        assert_relative_eq!(curve.forward(0.5).unwrap(), 6.565, epsilon = 1e-12);
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_linear_interpolation_between_quotes() {
        let curve = fwd(FxForwardInterpolation::Linear);
        let d0: f64 = 6.5 / 6.53;
        let d1: f64 = 6.5 / 6.565;
        assert_relative_eq!(curve.discount_factor(0.375).unwrap(), 0.5 * (d0 + d1), epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_spot() {
        assert!(matches!(
            FxForwardCurve::new(anchor(), 0.0, &[1.0], &[0.1], FxForwardInterpolation::Linear),
            Err(MarketDataError::InvalidSpot { .. })
        ));
    }

    #[test]
    fn test_implied_foreign_curve_parity() {
        let dom = Arc::new(
            ZeroCurve::new(anchor(), &[0.25, 1.0], &[0.024, 0.026], Compounding::Continuous, CurveInterpolation::FlatForward)
                .unwrap(),
        );
        let forward = Arc::new(fwd(FxForwardInterpolation::LogLinear));
        let foreign = FxImpliedCurve::new(Arc::clone(&dom), Arc::clone(&forward)).unwrap();
        // F = S · df_f / df_d
        let t: f64 = 1.0;
        let implied = 6.5 * foreign.discount_factor(t).unwrap() / dom.discount_factor(t).unwrap();
        assert_relative_eq!(implied, forward.forward(t).unwrap(), epsilon = 1e-12);
    }
}
