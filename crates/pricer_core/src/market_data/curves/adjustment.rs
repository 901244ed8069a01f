//! Parallel shift and pivot rotation of zero curves.

use super::ZeroCurve;
use crate::market_data::error::MarketDataError;

const BP: f64 = 1e-4;
const KNOT_EPS: f64 = 1e-10;

/// Rotation of the zero curve around a pivot tenor.
///
/// A knot at tenor τ moves by `shift_bp · (clamp(τ, start, end) − pivot) / (end − start)`
/// basis points, so the curve steepens for a positive shift when the
/// pivot lies inside `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveRotation {
    /// Pivot tenor in years (zero move).
    pub pivot: f64,
    /// Start of the rotation range in years.
    pub start: f64,
    /// End of the rotation range in years.
    pub end: f64,
    /// Total rotation across the range in basis points.
    pub shift_bp: f64,
}

impl CurveRotation {
    fn increment_bp(&self, tenor: f64) -> f64 {
        let tau = tenor.clamp(self.start, self.end);
        self.shift_bp * (tau - self.pivot) / (self.end - self.start)
    }
}

/// Composable curve scenario: optional parallel shift plus optional rotation.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::{Compounding, CurveAdjustment, CurveRotation, ZeroCurve, CurveInterpolation};
/// use pricer_core::types::Date;
///
/// let anchor = Date::from_ymd(2021, 12, 27).unwrap();
/// let curve = ZeroCurve::new(anchor, &[1.0, 10.0], &[0.02, 0.03], Compounding::Continuous, CurveInterpolation::LinearZero).unwrap();
///
/// let adj = CurveAdjustment::parallel(10.0).with_rotation(CurveRotation {
///     pivot: 5.0, start: 1.0, end: 10.0, shift_bp: 9.0,
/// });
/// let shifted = adj.apply(&curve).unwrap();
/// assert_eq!(shifted.tenors(), &[1.0, 5.0, 10.0]);
/// assert!((shifted.rates()[2] - (0.03 + 0.0010 + 0.0005)).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveAdjustment {
    /// Parallel shift in basis points.
    pub parallel_shift_bp: Option<f64>,
    /// Rotation around a pivot.
    pub rotation: Option<CurveRotation>,
}

impl CurveAdjustment {
    /// Parallel shift only.
    pub fn parallel(shift_bp: f64) -> Self {
        Self {
            parallel_shift_bp: Some(shift_bp),
            rotation: None,
        }
    }

    /// Rotation only.
    pub fn rotation(rotation: CurveRotation) -> Self {
        Self {
            parallel_shift_bp: None,
            rotation: Some(rotation),
        }
    }

    /// Add (or replace) the rotation.
    pub fn with_rotation(mut self, rotation: CurveRotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// True when applying the adjustment would leave the curve unchanged.
    pub fn is_identity(&self) -> bool {
        self.parallel_shift_bp.map_or(true, |s| s == 0.0) && self.rotation.is_none()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merged(&self, other: &CurveAdjustment) -> CurveAdjustment {
        CurveAdjustment {
            parallel_shift_bp: other.parallel_shift_bp.or(self.parallel_shift_bp),
            rotation: other.rotation.or(self.rotation),
        }
    }

    /// Apply to `curve`, returning a new curve.
    ///
    /// Rotation pivot, start and end tenors that are not knots are first
    /// inserted at their interpolated rates.
    pub fn apply(&self, curve: &ZeroCurve) -> Result<ZeroCurve, MarketDataError> {
        let parallel = self.parallel_shift_bp.unwrap_or(0.0) * BP;

        let Some(rotation) = self.rotation else {
            if parallel == 0.0 {
                return Ok(curve.clone());
            }
            return curve.bump(parallel);
        };

        if !(rotation.end > rotation.start) {
            return Err(MarketDataError::InvalidInput(format!(
                "rotation range [{}, {}] is empty",
                rotation.start, rotation.end
            )));
        }

        let mut knots: Vec<(f64, f64)> = curve
            .tenors()
            .iter()
            .copied()
            .zip(curve.rates().iter().copied())
            .collect();
        for extra in [rotation.pivot, rotation.start, rotation.end] {
            if extra > 0.0 && !knots.iter().any(|(t, _)| (t - extra).abs() < KNOT_EPS) {
                knots.push((extra, curve.native_rate(extra)?));
            }
        }
        knots.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (tenors, rates): (Vec<f64>, Vec<f64>) = knots
            .into_iter()
            .map(|(t, r)| (t, r + parallel + rotation.increment_bp(t) * BP))
            .unzip();
        curve.with_knots(&tenors, &rates)
    }
}
