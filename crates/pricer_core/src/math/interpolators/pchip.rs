//! Piecewise cubic Hermite interpolation with Fritsch-Carlson slopes.
//!
//! The interpolant never overshoots the data: on every segment it stays
//! within the range of the two bracketing knot values, and it is monotone
//! wherever the data are.

use super::{find_segment, out_of_bounds, validate_knots, Interpolator};
use crate::types::InterpolationError;
use num_traits::Float;

/// Monotonicity-preserving cubic Hermite interpolator (PCHIP).
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{Interpolator, PchipInterpolator};
///
/// let interp = PchipInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.0]).unwrap();
/// let y = interp.interpolate(1.5).unwrap();
/// assert!(y <= 1.0 + 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PchipInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    slopes: Vec<T>,
}

impl<T: Float> PchipInterpolator<T> {
    /// Construct from strictly increasing `xs` (at least 2 points).
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        validate_knots(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes: Self::compute_slopes(xs, ys),
        })
    }

    fn compute_slopes(xs: &[T], ys: &[T]) -> Vec<T> {
        let n = xs.len();
        let h: Vec<T> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<T> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

        if n == 2 {
            return vec![delta[0]; 2];
        }

        let two = T::one() + T::one();
        let three = two + T::one();
        let mut d = vec![T::zero(); n];

        for k in 1..n - 1 {
            if delta[k - 1] * delta[k] <= T::zero() {
                continue;
            }
            let w1 = two * h[k] + h[k - 1];
            let w2 = h[k] + two * h[k - 1];
            d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }

        let end_slope = |h0: T, h1: T, d0: T, d1: T| -> T {
            let s = ((two * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
            if s.signum() != d0.signum() || d0 == T::zero() {
                T::zero()
            } else if d0.signum() != d1.signum() && s.abs() > (three * d0).abs() {
                three * d0
            } else {
                s
            }
        };
        d[0] = end_slope(h[0], h[1], delta[0], delta[1]);
        d[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
        d
    }

    /// Knot abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }
}

impl<T: Float> Interpolator<T> for PchipInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if x < lo || x > hi {
            return Err(out_of_bounds(x, &self.xs));
        }
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let two = T::one() + T::one();
        let three = two + T::one();

        let h00 = two * t3 - three * t2 + T::one();
        let h10 = t3 - two * t2 + t;
        let h01 = three * t2 - two * t3;
        let h11 = t3 - t2;

        Ok(h00 * self.ys[i]
            + h10 * h * self.slopes[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.slopes[i + 1])
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
