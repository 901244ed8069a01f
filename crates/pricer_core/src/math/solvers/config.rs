//! Solver configuration types.

use num_traits::Float;

/// Converts an `f64` literal into `T`, yielding NaN if it is not representable.
#[inline]
pub(crate) fn constant<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// Convergence settings shared by the root finders.
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert_eq!(config.max_iterations, 100);
///
/// let tight = SolverConfig::new(1e-14, 500);
/// assert!(tight.tolerance < config.tolerance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T: Float> {
    /// Stop once `|f(x)|` (Newton) or the bracket width (Brent) falls below this.
    pub tolerance: T,
    /// Iteration cap; exceeding it yields `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    fn default() -> Self {
        Self {
            tolerance: constant(1e-10),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a configuration. Non-positive tolerances and a zero iteration
    /// cap fall back to the defaults.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        let default = Self::default();
        Self {
            tolerance: if tolerance > T::zero() {
                tolerance
            } else {
                default.tolerance
            },
            max_iterations: if max_iterations > 0 {
                max_iterations
            } else {
                default.max_iterations
            },
        }
    }

    /// Tolerance 1e-14 and 500 iterations.
    pub fn high_precision() -> Self {
        Self {
            tolerance: constant(1e-14),
            max_iterations: 500,
        }
    }
}
