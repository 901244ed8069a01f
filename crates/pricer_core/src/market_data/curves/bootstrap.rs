//! Bootstrapping a discount curve from deposit and par-swap quotes.

use super::{Compounding, CurveInterpolation, YieldCurve, ZeroCurve};
use crate::market_data::error::MarketDataError;
use crate::math::solvers::{BrentSolver, SolverConfig};
use crate::types::{Date, DayCountConvention};
use tracing::debug;

/// Money-market deposit: simple rate over `tenor` years.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepositQuote {
    /// Maturity in curve years (ACT/365F).
    pub tenor: f64,
    /// Simple rate (decimal).
    pub rate: f64,
}

/// Par swap: fixed leg paying `rate` at the configured frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapQuote {
    /// Maturity in years.
    pub tenor: f64,
    /// Par fixed rate (decimal).
    pub rate: f64,
}

/// Bootstrap settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapConfig {
    /// Fixed-leg payments per year (4 for the quarterly CNY repo/SHIBOR swaps).
    pub fixed_frequency: u32,
    /// Basis of the deposit rates.
    pub deposit_day_count: DayCountConvention,
    /// Interpolation of the resulting curve.
    pub interpolation: CurveInterpolation,
    /// Per-knot Brent settings.
    pub solver: SolverConfig<f64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            fixed_frequency: 4,
            deposit_day_count: DayCountConvention::Actual365Fixed,
            interpolation: CurveInterpolation::FlatForward,
            solver: SolverConfig::new(1e-14, 200),
        }
    }
}

impl BootstrapConfig {
    fn deposit_accrual(&self, tenor: f64) -> f64 {
        match self.deposit_day_count {
            DayCountConvention::Actual360 => tenor * 365.0 / 360.0,
            _ => tenor,
        }
    }
}

/// Solve, knot by knot, for the continuously compounded zero rates that
/// reprice every deposit and par swap exactly.
///
/// Deposits shorter than the first swap are used as given; swaps whose
/// tenor is not beyond the last deposit are skipped.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::{bootstrap_curve, BootstrapConfig, DepositQuote, SwapQuote, YieldCurve};
/// use pricer_core::types::Date;
///
/// let anchor = Date::from_ymd(2021, 8, 13).unwrap();
/// let curve = bootstrap_curve(
///     anchor,
///     &[DepositQuote { tenor: 0.25, rate: 0.023 }],
///     &[SwapQuote { tenor: 1.0, rate: 0.025 }, SwapQuote { tenor: 2.0, rate: 0.026 }],
///     &BootstrapConfig::default(),
/// )
/// .unwrap();
/// assert!((curve.discount_factor(0.25).unwrap() - 1.0 / (1.0 + 0.023 * 0.25)).abs() < 1e-12);
/// ```
pub fn bootstrap_curve(
    anchor: Date,
    deposits: &[DepositQuote],
    swaps: &[SwapQuote],
    config: &BootstrapConfig,
) -> Result<ZeroCurve, MarketDataError> {
    if deposits.is_empty() && swaps.is_empty() {
        return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
    }
    if config.fixed_frequency == 0 {
        return Err(MarketDataError::InvalidInput(
            "swap fixed frequency must be positive".to_string(),
        ));
    }

    let mut deposits = deposits.to_vec();
    deposits.sort_by(|a, b| a.tenor.total_cmp(&b.tenor));
    let mut swaps = swaps.to_vec();
    swaps.sort_by(|a, b| a.tenor.total_cmp(&b.tenor));

    let mut tenors: Vec<f64> = Vec::new();
    let mut rates: Vec<f64> = Vec::new();

    for dep in &deposits {
        if !(dep.tenor > 0.0) || tenors.last().is_some_and(|t| dep.tenor <= *t) {
            return Err(MarketDataError::InvalidMaturity { t: dep.tenor });
        }
        let df = 1.0 / (1.0 + dep.rate * config.deposit_accrual(dep.tenor));
        if !(df > 0.0) {
            return Err(MarketDataError::InvalidInput(format!(
                "deposit rate {} at {} gives non-positive df",
                dep.rate, dep.tenor
            )));
        }
        tenors.push(dep.tenor);
        rates.push(Compounding::Continuous.rate_from_discount_factor(df, dep.tenor));
    }

    let solver = BrentSolver::new(config.solver);
    let f = config.fixed_frequency as f64;

    for swap in &swaps {
        // Swaps inside the deposit strip are already pinned.
        if tenors.last().is_some_and(|t| swap.tenor <= *t) {
            continue;
        }
        let n = (swap.tenor * f).round().max(1.0) as usize;
        let pay_times: Vec<f64> = (1..=n).map(|k| (k as f64 / f).min(swap.tenor)).collect();

        let par_error = |z: f64| -> f64 {
            let mut t = tenors.clone();
            let mut r = rates.clone();
            t.push(swap.tenor);
            r.push(z);
            let trial = match ZeroCurve::new(anchor, &t, &r, Compounding::Continuous, config.interpolation) {
                Ok(c) => c,
                Err(_) => return f64::NAN,
            };
            let mut annuity: f64 = 0.0;
            let mut prev: f64 = 0.0;
            for &tp in &pay_times {
                annuity += (tp - prev) * trial.discount_factor(tp).unwrap_or(f64::NAN);
                prev = tp;
            }
            let df_end = trial.discount_factor(swap.tenor).unwrap_or(f64::NAN);
            swap.rate * annuity - (1.0 - df_end)
        };

        let z = solver.find_root(par_error, -0.5, 1.0)?;
        debug!(tenor = swap.tenor, par = swap.rate, zero = z, "bootstrapped swap knot");
        tenors.push(swap.tenor);
        rates.push(z);
    }

    ZeroCurve::new(anchor, &tenors, &rates, Compounding::Continuous, config.interpolation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn anchor() -> Date {
        Date::from_ymd(2021, 8, 13).unwrap()
    }

    #[test]
    fn test_reprices_inputs() {
        let deposits = [
            DepositQuote { tenor: 1.0 / 12.0, rate: 0.0220 },
            DepositQuote { tenor: 0.25, rate: 0.0235 },
        ];
        let swaps = [
            SwapQuote { tenor: 1.0, rate: 0.0245 },
            SwapQuote { tenor: 2.0, rate: 0.0255 },
            SwapQuote { tenor: 5.0, rate: 0.0280 },
        ];
        let config = BootstrapConfig::default();
        let curve = bootstrap_curve(anchor(), &deposits, &swaps, &config).unwrap();

        for dep in &deposits {
            let df = curve.discount_factor(dep.tenor).unwrap();
            assert_relative_eq!((1.0 / df - 1.0) / dep.tenor, dep.rate, epsilon = 1e-12);
        }
        for swap in &swaps {
            let n = (swap.tenor * 4.0) as usize;
            let annuity: f64 = (1..=n)
                .map(|k| 0.25 * curve.discount_factor(k as f64 * 0.25).unwrap())
                .sum();
            let par = (1.0 - curve.discount_factor(swap.tenor).unwrap()) / annuity;
            assert_relative_eq!(par, swap.rate, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_act360_deposit_basis() {
        let config = BootstrapConfig {
            deposit_day_count: DayCountConvention::Actual360,
            ..BootstrapConfig::default()
        };
        let curve = bootstrap_curve(anchor(), &[DepositQuote { tenor: 0.5, rate: 0.03 }], &[], &config).unwrap();
        let accrual: f64 = 0.5 * 365.0 / 360.0;
        assert_relative_eq!(
            curve.discount_factor(0.5).unwrap(),
            1.0 / (1.0 + 0.03 * accrual),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_swaps_inside_deposit_strip_are_skipped() {
        let deposits = [
            DepositQuote { tenor: 0.25, rate: 0.0235 },
            DepositQuote { tenor: 1.0, rate: 0.0240 },
        ];
        let swaps = [
            SwapQuote { tenor: 1.0, rate: 0.0300 },
            SwapQuote { tenor: 3.0, rate: 0.0265 },
        ];
        let curve = bootstrap_curve(anchor(), &deposits, &swaps, &BootstrapConfig::default()).unwrap();
        let df = curve.discount_factor(1.0).unwrap();
        assert_relative_eq!(1.0 / df - 1.0, 0.0240, epsilon = 1e-12);
        assert!(curve.discount_factor(3.0).unwrap() < df);
    }

    #[test]
    fn test_empty_quotes() {
        assert!(bootstrap_curve(anchor(), &[], &[], &BootstrapConfig::default()).is_err());
    }
}
