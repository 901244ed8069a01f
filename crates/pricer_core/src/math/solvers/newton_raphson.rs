//! Newton-Raphson root-finding solver.

use super::config::constant;
use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Newton-Raphson iteration `x ← x - f(x)/f'(x)`.
///
/// Converges when `|f(x)| < tolerance`.
///
/// ```
/// use pricer_core::math::solvers::NewtonRaphsonSolver;
///
/// let solver = NewtonRaphsonSolver::with_defaults();
/// let root = solver.find_root(|x: f64| x.exp() - 2.0, |x| x.exp(), 0.0).unwrap();
/// assert!((root - 2f64.ln()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with [`SolverConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Find a root of `f` starting from `x0`.
    ///
    /// # Errors
    ///
    /// - `DerivativeNearZero` if `|f'(x)| < 1e-30`
    /// - `NumericalInstability` if an iterate is not finite
    /// - `MaxIterationsExceeded` if tolerance is not reached
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        self.find_root_within(f, f_prime, x0, T::neg_infinity(), T::infinity())
    }

    /// Newton iteration confined to the open interval `(lower, upper)`.
    ///
    /// A step that would leave the interval is replaced by a move halfway
    /// towards the violated bound, so domain restrictions such as
    /// `σ > 0` or `1 + y/f > 0` are never crossed.
    pub fn find_root_within<F, G>(
        &self,
        f: F,
        f_prime: G,
        x0: T,
        lower: T,
        upper: T,
    ) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let epsilon: T = constant(1e-30);
        let half: T = constant(0.5);
        let mut x = x0;

        for _ in 0..self.config.max_iterations {
            let f_val = f(x);
            if !f_val.is_finite() {
                return Err(SolverError::NumericalInstability(format!(
                    "objective not finite at x = {}",
                    x.to_f64().unwrap_or(f64::NAN)
                )));
            }
            if f_val.abs() < self.config.tolerance {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            if f_prime_val.abs() < epsilon || !f_prime_val.is_finite() {
                return Err(SolverError::DerivativeNearZero {
                    x: x.to_f64().unwrap_or(f64::NAN),
                });
            }

            let mut next = x - f_val / f_prime_val;
            if next <= lower {
                next = x + (lower - x) * half;
            } else if next >= upper {
                next = x + (upper - x) * half;
            }
            if !next.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced non-finite value".to_string(),
                ));
            }
            x = next;
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}
