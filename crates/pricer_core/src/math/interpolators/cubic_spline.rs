//! Natural cubic spline interpolation.

use super::{find_segment, out_of_bounds, validate_knots, Interpolator};
use crate::types::InterpolationError;
use num_traits::Float;

/// Segment polynomial `a + b·dx + c·dx² + d·dx³`, `dx = x - x_i`.
#[derive(Debug, Clone, Copy)]
struct SplineCoeffs<T: Float> {
    a: T,
    b: T,
    c: T,
    d: T,
}

/// Natural cubic spline interpolator (zero second derivative at both ends).
///
/// Requires at least 3 knots.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{Interpolator, CubicSplineInterpolator};
///
/// let interp = CubicSplineInterpolator::<f64>::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0]).unwrap();
/// assert!((interp.interpolate(2.0).unwrap() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSplineInterpolator<T: Float> {
    xs: Vec<T>,
    coeffs: Vec<SplineCoeffs<T>>,
}

impl<T: Float> CubicSplineInterpolator<T> {
    /// Construct a natural spline from strictly increasing `xs`.
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        validate_knots(xs, ys, 3)?;
        Ok(Self {
            xs: xs.to_vec(),
            coeffs: Self::compute_coefficients(xs, ys),
        })
    }

    /// Solves the tridiagonal system for the second-derivative terms
    /// (Thomas algorithm), then derives per-segment coefficients.
    fn compute_coefficients(xs: &[T], ys: &[T]) -> Vec<SplineCoeffs<T>> {
        let n = xs.len();
        let two = T::one() + T::one();
        let three = two + T::one();

        let h: Vec<T> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        // c[0] = c[n-1] = 0 (natural boundary)
        let mut c = vec![T::zero(); n];
        let mut diag = vec![T::one(); n];
        let mut rhs = vec![T::zero(); n];
        let mut upper = vec![T::zero(); n];

        for i in 1..n - 1 {
            let lower = h[i - 1];
            let d = two * (h[i - 1] + h[i]) - lower * upper[i - 1];
            diag[i] = d;
            upper[i] = h[i] / d;
            let r = three * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            rhs[i] = (r - lower * rhs[i - 1]) / d;
        }

        for i in (1..n - 1).rev() {
            c[i] = rhs[i] - upper[i] * c[i + 1];
        }

        (0..n - 1)
            .map(|i| SplineCoeffs {
                a: ys[i],
                b: (ys[i + 1] - ys[i]) / h[i] - h[i] * (c[i + 1] + two * c[i]) / three,
                c: c[i],
                d: (c[i + 1] - c[i]) / (three * h[i]),
            })
            .collect()
    }

    /// Knot abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Number of knots.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false for a constructed interpolator.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

impl<T: Float> Interpolator<T> for CubicSplineInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if x < lo || x > hi {
            return Err(out_of_bounds(x, &self.xs));
        }
        let i = find_segment(&self.xs, x);
        let s = self.coeffs[i];
        let dx = x - self.xs[i];
        Ok(s.a + dx * (s.b + dx * (s.c + dx * s.d)))
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_needs_three_points() {
        assert_eq!(
            CubicSplineInterpolator::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap_err(),
            InterpolationError::InsufficientData { got: 2, need: 3 }
        );
    }

    #[test]
    fn test_reproduces_knots() {
        let xs = [0.0, 0.5, 1.5, 3.0, 4.0];
        let ys = [1.0, -0.5, 2.0, 0.25, 3.0];
        let spline = CubicSplineInterpolator::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_data_is_exact() {
        let spline = CubicSplineInterpolator::new(&[0.0, 1.0, 2.0, 4.0], &[1.0, 3.0, 5.0, 9.0]).unwrap();
        assert_relative_eq!(spline.interpolate(3.0).unwrap(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_c1_continuity_at_interior_knot() {
        let spline =
            CubicSplineInterpolator::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        let h = 1e-6;
        let left = (spline.interpolate(1.0).unwrap() - spline.interpolate(1.0 - h).unwrap()) / h;
        let right = (spline.interpolate(1.0 + h).unwrap() - spline.interpolate(1.0).unwrap()) / h;
        assert_relative_eq!(left, right, epsilon = 1e-4);
    }

    #[test]
    fn test_out_of_bounds() {
        let spline = CubicSplineInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!(spline.interpolate(2.5).is_err());
        assert_relative_eq!(spline.interpolate_clamped(2.5), 4.0, epsilon = 1e-12);
    }
}
