//! Static-dispatch sum over the curve kinds.

use super::{FxForwardCurve, FxImpliedCurve, YieldCurve, ZeroCurve};
use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};

/// Any discount curve the pricers consume.
///
/// Enum dispatch keeps curves `Clone + Send + Sync` without trait objects.
///
/// ```
/// use pricer_core::market_data::{Compounding, CurveEnum, YieldCurve, ZeroCurve};
/// use pricer_core::types::Date;
///
/// let anchor = Date::from_ymd(2021, 8, 13).unwrap();
/// let curve: CurveEnum = ZeroCurve::flat(anchor, 0.02, Compounding::Continuous).unwrap().into();
/// assert!((curve.discount_factor(1.0).unwrap() - (-0.02f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub enum CurveEnum {
    /// Knot-based zero curve.
    Zero(ZeroCurve),
    /// FX forward discount curve.
    FxForward(FxForwardCurve),
    /// Foreign curve implied from a domestic and an FX forward curve.
    FxImplied(FxImpliedCurve),
}

impl CurveEnum {
    /// Flat continuously compounded curve.
    pub fn flat(anchor: Date, rate: f64) -> Result<Self, MarketDataError> {
        Ok(CurveEnum::Zero(ZeroCurve::flat(
            anchor,
            rate,
            super::Compounding::Continuous,
        )?))
    }

    /// Parallel rate bump; the FX forward curve has no rates and is rejected.
    pub fn bump(&self, delta: f64) -> Result<Self, MarketDataError> {
        match self {
            CurveEnum::Zero(c) => Ok(CurveEnum::Zero(c.bump(delta)?)),
            CurveEnum::FxImplied(c) => Ok(CurveEnum::FxImplied(c.bump(delta)?)),
            CurveEnum::FxForward(_) => Err(MarketDataError::InvalidInput(
                "an fx forward curve cannot be bumped in rate".to_string(),
            )),
        }
    }

    /// The zero curve, if this is one.
    pub fn as_zero(&self) -> Option<&ZeroCurve> {
        match self {
            CurveEnum::Zero(c) => Some(c),
            _ => None,
        }
    }
}

impl YieldCurve for CurveEnum {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        match self {
            CurveEnum::Zero(c) => c.discount_factor(t),
            CurveEnum::FxForward(c) => c.discount_factor(t),
            CurveEnum::FxImplied(c) => c.discount_factor(t),
        }
    }

    fn anchor(&self) -> Date {
        match self {
            CurveEnum::Zero(c) => c.anchor(),
            CurveEnum::FxForward(c) => c.anchor(),
            CurveEnum::FxImplied(c) => c.anchor(),
        }
    }

    fn day_count(&self) -> DayCountConvention {
        match self {
            CurveEnum::Zero(c) => c.day_count(),
            CurveEnum::FxForward(c) => c.day_count(),
            CurveEnum::FxImplied(c) => c.day_count(),
        }
    }
}

impl From<ZeroCurve> for CurveEnum {
    fn from(curve: ZeroCurve) -> Self {
        CurveEnum::Zero(curve)
    }
}

impl From<FxForwardCurve> for CurveEnum {
    fn from(curve: FxForwardCurve) -> Self {
        CurveEnum::FxForward(curve)
    }
}

impl From<FxImpliedCurve> for CurveEnum {
    fn from(curve: FxImpliedCurve) -> Self {
        CurveEnum::FxImplied(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::FxForwardInterpolation;

    #[test]
    fn test_bump_dispatch() {
        let anchor = Date::from_ymd(2021, 8, 13).unwrap();
        let curve = CurveEnum::flat(anchor, 0.02).unwrap();
        let bumped = curve.bump(0.01).unwrap();
        assert!(bumped.discount_factor(2.0).unwrap() < curve.discount_factor(2.0).unwrap());

        let fx: CurveEnum = FxForwardCurve::new(anchor, 6.5, &[1.0], &[0.1], FxForwardInterpolation::Linear)
            .unwrap()
            .into();
        assert!(fx.bump(0.01).is_err());
        assert!(fx.as_zero().is_none());
    }
}
