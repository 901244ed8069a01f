//! Linear interpolation implementation.

use super::{find_segment, out_of_bounds, validate_knots, Interpolator};
use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::<f64>::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0]).unwrap();
/// assert_eq!(interp.domain(), (0.0, 2.0));
/// assert!((interp.interpolate(0.5).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Construct from strictly increasing `xs` and matching `ys` (at least 2 points).
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        validate_knots(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Knot abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Knot values.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
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

    /// Linear extension of the end segments beyond the domain.
    pub fn extrapolate(&self, x: T) -> T {
        let i = find_segment(&self.xs, x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        self.ys[i] + (self.ys[i + 1] - self.ys[i]) * t
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (lo, hi) = self.domain();
        if x < lo || x > hi {
            return Err(out_of_bounds(x, &self.xs));
        }
        Ok(self.extrapolate(x))
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
    use proptest::prelude::*;

    #[test]
    fn test_insufficient_data() {
        let result = LinearInterpolator::new(&[1.0], &[2.0]);
        assert_eq!(
            result.unwrap_err(),
            InterpolationError::InsufficientData { got: 1, need: 2 }
        );
    }

    #[test]
    fn test_mismatched_lengths() {
        match LinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err() {
            InterpolationError::InvalidInput(msg) => assert!(msg.contains("same length")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_knots_reproduced() {
        let interp = LinearInterpolator::new(&[0.0, 1.0, 3.0], &[1.0, 3.0, -1.0]).unwrap();
        assert_eq!(interp.interpolate(0.0).unwrap(), 1.0);
        assert_eq!(interp.interpolate(1.0).unwrap(), 3.0);
        assert_eq!(interp.interpolate(3.0).unwrap(), -1.0);
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_bounds_and_clamp() {
        let interp = LinearInterpolator::new(&[1.0, 2.0], &[10.0, 20.0]).unwrap();
        assert!(matches!(
            interp.interpolate(0.5),
            Err(InterpolationError::OutOfBounds { .. })
        ));
        assert_eq!(interp.interpolate_clamped(0.5), 10.0);
        assert_relative_eq!(interp.extrapolate(3.0), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_with_f32() {
        let interp = LinearInterpolator::new(&[0.0f32, 2.0], &[0.0f32, 1.0]).unwrap();
        assert!((interp.interpolate(1.0).unwrap() - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_bounded_by_neighbours(x in 0.0f64..4.0) {
            let ys = [0.5, 2.0, -1.0, 0.0, 3.0];
            let interp = LinearInterpolator::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &ys).unwrap();
            let i = find_segment(interp.xs(), x);
            let y = interp.interpolate(x).unwrap();
            let (a, b) = (ys[i].min(ys[i + 1]), ys[i].max(ys[i + 1]));
            prop_assert!(y >= a - 1e-12 && y <= b + 1e-12);
        }
    }
}
