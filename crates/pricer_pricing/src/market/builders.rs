//! Turning raw market-data payloads into curves and surfaces.
//!
//! Unit conventions of the payloads:
//!
//! - Curve rates and volatilities are quoted in percent.
//! - FX swap points are quoted in pips (1e-4 of the quote currency).
//! - Tenor labels follow the money-market style `O/N`, `1W`, `3M`, `10Y`.

use std::fmt;
use std::str::FromStr;

use pricer_core::market_data::{
    bootstrap_curve, BootstrapConfig, Compounding, CurveInterpolation, DeltaConvention, DepositQuote,
    FxForwardCurve, FxForwardInterpolation, FxVolQuote, FxVolSurface, SwapQuote, YieldCurve, ZeroCurve,
};
use pricer_core::types::{Date, DayCountConvention, PricingError};
use tracing::debug;

use super::{BondYieldCurve, FxVolCurves, FxVolType, IrsCurve, ShiborCurve, SwapPointCurve};

const PERCENT: f64 = 100.0;
const PIPS: f64 = 10_000.0;
const TRADING_DAYS: f64 = 252.0;

/// A quoted tenor.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_pricing::market::Tenor;
///
/// let anchor = Date::from_ymd(2021, 8, 20).unwrap();
/// let t: Tenor = "3M".parse().unwrap();
/// assert_eq!(t, Tenor::Months(3));
/// assert_eq!(t.add_to(anchor).unwrap(), Date::from_ymd(2021, 11, 20).unwrap());
/// assert_eq!("O/N".parse::<Tenor>().unwrap(), Tenor::Days(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tenor {
    /// Calendar days.
    Days(i64),
    /// Weeks.
    Weeks(i64),
    /// Months, end-of-month clamped.
    Months(i32),
    /// Years.
    Years(i32),
}

impl Tenor {
    /// Date `self` after `anchor`.
    pub fn add_to(&self, anchor: Date) -> Result<Date, PricingError> {
        Ok(match *self {
            Tenor::Days(n) => anchor.add_days(n)?,
            Tenor::Weeks(n) => anchor.add_days(7 * n)?,
            Tenor::Months(n) => anchor.add_months(n)?,
            Tenor::Years(n) => anchor.add_months(12 * n)?,
        })
    }

    /// ACT/365F year fraction from `anchor`.
    pub fn year_fraction(&self, anchor: Date) -> Result<f64, PricingError> {
        let end = self.add_to(anchor)?;
        Ok(DayCountConvention::Actual365Fixed.year_frac(anchor, end).fraction)
    }
}

impl FromStr for Tenor {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        match label.as_str() {
            "ON" | "O/N" | "1D" => return Ok(Tenor::Days(1)),
            "TN" | "T/N" => return Ok(Tenor::Days(2)),
            _ => {}
        }
        let bad = || PricingError::InvalidMarketData(format!("unrecognised tenor {s:?}"));
        let (num, unit) = label.split_at(label.len().saturating_sub(1));
        let n: i64 = num.parse().map_err(|_| bad())?;
        if n <= 0 {
            return Err(bad());
        }
        match unit {
            "D" => Ok(Tenor::Days(n)),
            "W" => Ok(Tenor::Weeks(n)),
            "M" => Ok(Tenor::Months(i32::try_from(n).map_err(|_| bad())?)),
            "Y" => Ok(Tenor::Years(i32::try_from(n).map_err(|_| bad())?)),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Days(n) => write!(f, "{n}D"),
            Tenor::Weeks(n) => write!(f, "{n}W"),
            Tenor::Months(n) => write!(f, "{n}M"),
            Tenor::Years(n) => write!(f, "{n}Y"),
        }
    }
}

fn check_lengths(what: &str, a: usize, b: usize) -> Result<(), PricingError> {
    if a != b || a == 0 {
        return Err(PricingError::InvalidMarketData(format!(
            "{what}: column lengths {a} and {b}"
        )));
    }
    Ok(())
}

/// Drops non-positive tenors and keeps the first of any repeated tenor.
fn knots(tenors: &[f64], values: &[f64], scale: f64) -> (Vec<f64>, Vec<f64>) {
    let mut ts = Vec::with_capacity(tenors.len());
    let mut vs = Vec::with_capacity(values.len());
    for (&t, &v) in tenors.iter().zip(values) {
        if t > 0.0 && ts.last().map_or(true, |&last| t > last) {
            ts.push(t);
            vs.push(v / scale);
        }
    }
    (ts, vs)
}

/// Zero curve from a bond yield curve snapshot: annually compounded spot
/// rates, linear in zero rate.
pub fn bond_yield_zero_curve(anchor: Date, data: &BondYieldCurve) -> Result<ZeroCurve, PricingError> {
    check_lengths("bond yield curve", data.tenor.len(), data.spot_rate.len())?;
    let (tenors, rates) = knots(&data.tenor, &data.spot_rate, PERCENT);
    Ok(ZeroCurve::new(
        anchor,
        &tenors,
        &rates,
        Compounding::Periodic(1),
        CurveInterpolation::LinearZero,
    )?)
}

/// Zero curve from SHIBOR fixings taken as simple rates to each tenor.
pub fn shibor_zero_curve(anchor: Date, data: &ShiborCurve) -> Result<ZeroCurve, PricingError> {
    check_lengths("shibor curve", data.tenor.len(), data.rate.len())?;
    let (tenors, rates) = knots(&data.tenor, &data.rate, PERCENT);
    Ok(ZeroCurve::new(
        anchor,
        &tenors,
        &rates,
        Compounding::Simple,
        CurveInterpolation::LinearZero,
    )?)
}

/// Curve bootstrapped from swap fixings.
///
/// Quotes under one year are single-period instruments and enter as
/// deposits; the rest are par swaps on the configured fixed leg.
pub fn irs_zero_curve(anchor: Date, data: &IrsCurve, config: &BootstrapConfig) -> Result<ZeroCurve, PricingError> {
    check_lengths("irs curve", data.tenor.len(), data.average.len())?;
    let (tenors, rates) = knots(&data.tenor, &data.average, PERCENT);
    let mut deposits = Vec::new();
    let mut swaps = Vec::new();
    for (tenor, rate) in tenors.into_iter().zip(rates) {
        if tenor < 1.0 {
            deposits.push(DepositQuote { tenor, rate });
        } else {
            swaps.push(SwapQuote { tenor, rate });
        }
    }
    let curve = bootstrap_curve(anchor, &deposits, &swaps, config)?;
    debug!(
        anchor = %anchor,
        deposits = deposits.len(),
        swaps = swaps.len(),
        "bootstrapped swap curve"
    );
    Ok(curve)
}

/// FX forward curve from spot and swap points in pips.
pub fn fx_forward_curve(anchor: Date, spot: f64, data: &SwapPointCurve) -> Result<FxForwardCurve, PricingError> {
    check_lengths("swap points", data.origin_tenor.len(), data.swap_point.len())?;
    let mut tenors = Vec::with_capacity(data.origin_tenor.len());
    let mut points = Vec::with_capacity(data.swap_point.len());
    for (label, &pips) in data.origin_tenor.iter().zip(&data.swap_point) {
        let t = label.parse::<Tenor>()?.year_fraction(anchor)?;
        if tenors.last().map_or(true, |&last| t > last) {
            tenors.push(t);
            points.push(pips / PIPS);
        }
    }
    Ok(FxForwardCurve::new(
        anchor,
        spot,
        &tenors,
        &points,
        FxForwardInterpolation::Linear,
    )?)
}

/// FX smile surface from ATM, 25Δ and 10Δ quotes aligned on the ATM tenors.
///
/// # Errors
/// `InvalidMarketData` if any quote type is missing a tenor the ATM curve has.
pub fn fx_vol_surface<C: YieldCurve>(
    data: &FxVolCurves,
    forward: FxForwardCurve,
    domestic: &C,
    convention: DeltaConvention,
) -> Result<FxVolSurface, PricingError> {
    let column = |ty: FxVolType| {
        data.get(&ty)
            .ok_or_else(|| PricingError::InvalidMarketData(format!("fx volatility type {ty:?} missing")))
    };
    let atm = column(FxVolType::Atm)?;
    check_lengths("atm volatility", atm.tenor.len(), atm.volatility.len())?;
    let quote_at = |ty: FxVolType, label: &str| -> Result<f64, PricingError> {
        let c = column(ty)?;
        c.tenor
            .iter()
            .position(|l| l == label)
            .and_then(|i| c.volatility.get(i).copied())
            .map(|v| v / PERCENT)
            .ok_or_else(|| PricingError::InvalidMarketData(format!("fx volatility {ty:?} has no {label} quote")))
    };
    let anchor = forward.anchor();
    let mut quotes = Vec::with_capacity(atm.tenor.len());
    for (label, &vol) in atm.tenor.iter().zip(&atm.volatility) {
        quotes.push(FxVolQuote {
            tenor: label.parse::<Tenor>()?.year_fraction(anchor)?,
            atm: vol / PERCENT,
            rr25: quote_at(FxVolType::Rr25, label)?,
            bf25: quote_at(FxVolType::Bf25, label)?,
            rr10: quote_at(FxVolType::Rr10, label)?,
            bf10: quote_at(FxVolType::Bf10, label)?,
        });
    }
    quotes.sort_by(|a, b| a.tenor.total_cmp(&b.tenor));
    Ok(FxVolSurface::new(&quotes, forward, domestic, convention)?)
}

/// Annualised close-to-close volatility of a price series.
///
/// # Errors
/// `InsufficientInput` with fewer than three observations;
/// `InvalidMarketData` for a non-positive price.
pub fn historical_volatility(series: &[(Date, f64)]) -> Result<f64, PricingError> {
    if series.len() < 3 {
        return Err(PricingError::InsufficientInput(format!(
            "historical volatility needs at least 3 prices, got {}",
            series.len()
        )));
    }
    if let Some((d, p)) = series.iter().find(|(_, p)| !(*p > 0.0)) {
        return Err(PricingError::InvalidMarketData(format!("price {p} on {d}")));
    }
    let returns: Vec<f64> = series.windows(2).map(|w| (w[1].1 / w[0].1).ln()).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok((var * TRADING_DAYS).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::VolCurve;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_tenor_parsing() {
        assert_eq!("1w".parse::<Tenor>().unwrap(), Tenor::Weeks(1));
        assert_eq!("10Y".parse::<Tenor>().unwrap(), Tenor::Years(10));
        assert_eq!("ON".parse::<Tenor>().unwrap(), Tenor::Days(1));
        assert!("0M".parse::<Tenor>().is_err());
        assert!("3Q".parse::<Tenor>().is_err());
        assert!("".parse::<Tenor>().is_err());
        assert_eq!(Tenor::Months(6).to_string(), "6M");
    }

    #[test]
    fn test_tenor_year_fraction() {
        let anchor = d(2021, 8, 20);
        assert_relative_eq!(Tenor::Weeks(1).year_fraction(anchor).unwrap(), 7.0 / 365.0);
        assert_relative_eq!(Tenor::Years(1).year_fraction(anchor).unwrap(), 1.0);
    }

    #[test]
    fn test_bond_curve_skips_zero_tenor() {
        let data = BondYieldCurve {
            tenor: vec![0.0, 1.0, 5.0, 10.0],
            spot_rate: vec![1.9, 2.2, 2.6, 2.8],
            ytm: vec![],
        };
        let curve = bond_yield_zero_curve(d(2021, 12, 27), &data).unwrap();
        assert_eq!(curve.tenors(), &[1.0, 5.0, 10.0]);
        let z = curve.zero_rate(5.0, Compounding::Periodic(1)).unwrap();
        assert_relative_eq!(z, 0.026, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let data = ShiborCurve {
            tenor: vec![0.25, 0.5],
            origin_tenor: vec!["3M".into(), "6M".into()],
            rate: vec![2.4],
        };
        assert!(matches!(
            shibor_zero_curve(d(2021, 12, 27), &data),
            Err(PricingError::InvalidMarketData(_))
        ));
    }

    #[test]
    fn test_irs_bootstrap_reprices_deposit() {
        let data = IrsCurve {
            tenor: vec![0.25, 0.5, 1.0, 2.0, 5.0],
            origin_tenor: vec!["3M".into(), "6M".into(), "1Y".into(), "2Y".into(), "5Y".into()],
            average: vec![2.2, 2.25, 2.3, 2.4, 2.6],
        };
        let curve = irs_zero_curve(d(2021, 12, 27), &data, &BootstrapConfig::default()).unwrap();
        let df = curve.discount_factor(0.25).unwrap();
        assert_relative_eq!((1.0 / df - 1.0) / 0.25, 0.022, epsilon = 1e-9);
    }

    #[test]
    fn test_fx_forward_curve_in_pips() {
        let anchor = d(2021, 8, 20);
        let data = SwapPointCurve {
            origin_tenor: vec!["1M".into(), "1Y".into()],
            swap_point: vec![115.0, 1370.0],
        };
        let curve = fx_forward_curve(anchor, 6.5, &data).unwrap();
        assert_relative_eq!(curve.forward(1.0).unwrap(), 6.637, epsilon = 1e-12);
    }

    #[test]
    fn test_vol_surface_requires_all_types() {
        let anchor = d(2021, 8, 20);
        let fwd = fx_forward_curve(
            anchor,
            6.5,
            &SwapPointCurve {
                origin_tenor: vec!["1M".into(), "1Y".into()],
                swap_point: vec![115.0, 1370.0],
            },
        )
        .unwrap();
        let domestic = ZeroCurve::flat(anchor, 0.022, Compounding::Continuous).unwrap();
        let curve = |v: f64| VolCurve {
            tenor: vec!["1M".into(), "1Y".into()],
            volatility: vec![v, v],
        };
        let mut data = FxVolCurves::new();
        data.insert(FxVolType::Atm, curve(4.5));
        assert!(fx_vol_surface(&data, fwd.clone(), &domestic, DeltaConvention::Spot).is_err());
        data.insert(FxVolType::Rr25, curve(0.6));
        data.insert(FxVolType::Bf25, curve(0.15));
        data.insert(FxVolType::Rr10, curve(1.2));
        data.insert(FxVolType::Bf10, curve(0.5));
        let surface = fx_vol_surface(&data, fwd, &domestic, DeltaConvention::Spot).unwrap();
        assert_relative_eq!(surface.atm_volatility(0.5).unwrap(), 0.045, epsilon = 1e-10);
    }

    #[test]
    fn test_historical_volatility() {
        let base = d(2021, 1, 4);
        // Alternating +-1% log returns.
        let series: Vec<(Date, f64)> = (0..21)
            .map(|i| {
                let p = if i % 2 == 0 { 10.0 } else { 10.0 * 0.01f64.exp() };
                (base.add_days(i).unwrap(), p)
            })
            .collect();
        let vol = historical_volatility(&series).unwrap();
        let n: f64 = 20.0;
        let expected = (0.0001 * n / (n - 1.0) * 252.0).sqrt();
        assert_relative_eq!(vol, expected, epsilon = 1e-12);
        assert!(matches!(
            historical_volatility(&series[..2]),
            Err(PricingError::InsufficientInput(_))
        ));
    }
}
