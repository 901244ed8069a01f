//! One-dimensional interpolation.
//!
//! - [`LinearInterpolator`]: piecewise linear
//! - [`CubicSplineInterpolator`]: natural cubic spline, C² continuous
//! - [`PchipInterpolator`]: Fritsch-Carlson monotone cubic Hermite
//!
//! All interpolators are generic over `T: num_traits::Float` and validate
//! that abscissae are strictly increasing at construction.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
//!
//! let interp = LinearInterpolator::<f64>::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
//! assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-12);
//! assert_eq!(interp.interpolate_clamped(5.0), 4.0);
//! ```

mod cubic_spline;
mod linear;
mod pchip;

pub use cubic_spline::CubicSplineInterpolator;
pub use linear::LinearInterpolator;
pub use pchip::PchipInterpolator;

use crate::types::InterpolationError;
use num_traits::Float;

/// Common interface for 1D interpolators.
pub trait Interpolator<T: Float> {
    /// Interpolated value at `x`; errors outside [`domain`](Self::domain).
    fn interpolate(&self, x: T) -> Result<T, InterpolationError>;

    /// Closed interval `(x_min, x_max)` spanned by the knots.
    fn domain(&self) -> (T, T);

    /// Interpolated value with `x` clamped into the domain (flat extrapolation).
    fn interpolate_clamped(&self, x: T) -> T {
        let (lo, hi) = self.domain();
        let xc = x.max(lo).min(hi);
        self.interpolate(xc).unwrap_or_else(|_| T::nan())
    }
}

/// Shared knot validation: equal lengths, at least `need` points, strictly increasing.
pub(crate) fn validate_knots<T: Float>(
    xs: &[T],
    ys: &[T],
    need: usize,
) -> Result<(), InterpolationError> {
    if xs.len() != ys.len() {
        return Err(InterpolationError::InvalidInput(format!(
            "xs and ys must have same length: got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < need {
        return Err(InterpolationError::InsufficientData {
            got: xs.len(),
            need,
        });
    }
    if let Some(index) = xs.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(InterpolationError::NonMonotonicData { index: index + 1 });
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(InterpolationError::InvalidInput(
            "non-finite knot value".to_string(),
        ));
    }
    Ok(())
}

/// Segment index `i` with `xs[i] <= x < xs[i+1]`, clamped to `[0, n-2]`.
#[inline]
pub(crate) fn find_segment<T: Float>(xs: &[T], x: T) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);
    pos.saturating_sub(1).min(xs.len() - 2)
}

pub(crate) fn out_of_bounds<T: Float>(x: T, xs: &[T]) -> InterpolationError {
    InterpolationError::OutOfBounds {
        x: x.to_f64().unwrap_or(f64::NAN),
        min: xs[0].to_f64().unwrap_or(f64::NAN),
        max: xs[xs.len() - 1].to_f64().unwrap_or(f64::NAN),
    }
}
