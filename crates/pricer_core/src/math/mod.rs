//! Numerical primitives shared by curves, surfaces and pricers.
//!
//! - [`distributions`]: standard normal density, distribution and quantile
//! - [`interpolators`]: linear, natural cubic spline and PCHIP interpolation
//! - [`solvers`]: Newton-Raphson and Brent root finders

pub mod distributions;
pub mod interpolators;
pub mod solvers;
