//! Brent's bracketing root finder.

use super::config::constant;
use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Brent's method: inverse quadratic interpolation and secant steps,
/// falling back to bisection, on a sign-changing bracket.
///
/// Converges when the bracket half-width falls below
/// `2·ε·|b| + tolerance/2` or `f(b)` is exactly zero.
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with [`SolverConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Find a root of `f` in `[a, b]`.
    ///
    /// # Errors
    ///
    /// - `NoBracket` if `f(a)` and `f(b)` share a sign
    /// - `MaxIterationsExceeded` if the bracket does not shrink to tolerance
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let two: T = constant(2.0);
        let three: T = constant(3.0);
        let half: T = constant(0.5);

        let (mut a, mut b) = (a, b);
        let (mut fa, mut fb) = (f(a), f(b));
        if fa == T::zero() {
            return Ok(a);
        }
        if fb == T::zero() {
            return Ok(b);
        }
        if (fa > T::zero()) == (fb > T::zero()) || !fa.is_finite() || !fb.is_finite() {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            if (fb > T::zero()) == (fc > T::zero()) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol1 = two * T::epsilon() * b.abs() + half * self.config.tolerance;
            let xm = half * (c - b);
            if xm.abs() <= tol1 || fb == T::zero() {
                return Ok(b);
            }

            if e.abs() >= tol1 && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q);
                if a == c {
                    p = two * xm * s;
                    q = T::one() - s;
                } else {
                    let qa = fa / fc;
                    let r = fb / fc;
                    p = s * (two * xm * qa * (qa - r) - (b - a) * (r - T::one()));
                    q = (qa - T::one()) * (r - T::one()) * (s - T::one());
                }
                if p > T::zero() {
                    q = -q;
                }
                p = p.abs();
                let min1 = three * xm * q - (tol1 * q).abs();
                let min2 = (e * q).abs();
                if two * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }

            a = b;
            fa = fb;
            if d.abs() > tol1 {
                b = b + d;
            } else {
                b = b + if xm > T::zero() { tol1 } else { -tol1 };
            }
            fb = f(b);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_root() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x: f64| x * x * x - x - 2.0, 1.0, 2.0).unwrap();
        assert_relative_eq!(root, 1.521_379_706_804_567_6, epsilon = 1e-9);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::with_defaults();
        let err = solver.find_root(|x: f64| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert_eq!(err, SolverError::NoBracket { a: -1.0, b: 1.0 });
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BrentSolver::with_defaults();
        assert_eq!(solver.find_root(|x: f64| x - 1.0, 1.0, 3.0).unwrap(), 1.0);
    }

    #[test]
    fn test_reversed_bracket() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x: f64| x.sin(), 4.0, 2.0).unwrap();
        assert_relative_eq!(root, std::f64::consts::PI, epsilon = 1e-9);
    }
}
