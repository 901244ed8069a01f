//! Root finders used for yields, implied volatilities and curve bootstrapping.
//!
//! - [`NewtonRaphsonSolver`]: quadratic convergence given an analytic derivative
//! - [`BrentSolver`]: bracketing method without derivatives
//!
//! Both take a [`SolverConfig`] (default tolerance 1e-10, 100 iterations).
//!
//! ```
//! use pricer_core::math::solvers::{BrentSolver, NewtonRaphsonSolver, SolverConfig};
//!
//! let newton = NewtonRaphsonSolver::new(SolverConfig::default());
//! let root = newton.find_root(|x: f64| x * x - 2.0, |x| 2.0 * x, 1.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//!
//! let brent = BrentSolver::with_defaults();
//! let root = brent.find_root(|x: f64| x.cos() - x, 0.0, 1.0).unwrap();
//! assert!((root - 0.739_085_133_215_160_6).abs() < 1e-9);
//! ```

mod brent;
mod config;
mod newton_raphson;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use newton_raphson::NewtonRaphsonSolver;
