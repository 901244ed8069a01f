//! FX implied-volatility surface built from delta-quoted market data.
//!
//! Each tenor carries ATM, 25Δ and 10Δ risk-reversal and butterfly quotes.
//! Wing volatilities follow the broker convention
//! `σ_C = σ_ATM + BF + RR/2`, `σ_P = σ_ATM + BF − RR/2`; wing deltas are
//! converted to strikes by Garman-Kohlhagen inversion, and a natural cubic
//! spline in strike is fitted through the five points of each smile.
//! Between tenors the surface is linear in total variance `σ²t` at
//! constant forward moneyness `K/F(t)`, so ATM interpolates ATM.

use super::traits::check_query;
use super::VolatilitySurface;
use crate::market_data::curves::{FxForwardCurve, YieldCurve};
use crate::market_data::error::MarketDataError;
use crate::math::distributions::{inverse_norm_cdf, norm_cdf};
use crate::math::interpolators::{CubicSplineInterpolator, Interpolator};
use crate::math::solvers::BrentSolver;
use std::fmt;
use std::str::FromStr;

/// How a quoted delta relates to the option's sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaConvention {
    /// `e^{-r_f τ} N(d1)`.
    #[default]
    Spot,
    /// `N(d1)`.
    Forward,
    /// Spot delta net of the premium paid in the foreign currency.
    PremiumAdjustedSpot,
    /// Forward delta net of premium: `(K/F) N(d2)`.
    PremiumAdjustedForward,
}

impl DeltaConvention {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            DeltaConvention::Spot => "spot",
            DeltaConvention::Forward => "forward",
            DeltaConvention::PremiumAdjustedSpot => "premium_adjusted_spot",
            DeltaConvention::PremiumAdjustedForward => "premium_adjusted_forward",
        }
    }

    fn is_spot(&self) -> bool {
        matches!(
            self,
            DeltaConvention::Spot | DeltaConvention::PremiumAdjustedSpot
        )
    }

    fn is_premium_adjusted(&self) -> bool {
        matches!(
            self,
            DeltaConvention::PremiumAdjustedSpot | DeltaConvention::PremiumAdjustedForward
        )
    }
}

impl fmt::Display for DeltaConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeltaConvention {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "spot" => Ok(DeltaConvention::Spot),
            "forward" | "fwd" => Ok(DeltaConvention::Forward),
            "premium_adjusted_spot" | "pa_spot" => Ok(DeltaConvention::PremiumAdjustedSpot),
            "premium_adjusted_forward" | "pa_forward" => {
                Ok(DeltaConvention::PremiumAdjustedForward)
            }
            other => Err(MarketDataError::InvalidInput(format!(
                "unknown delta convention: {other}"
            ))),
        }
    }
}

/// Market quotes for one tenor (volatilities as decimals).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxVolQuote {
    /// Tenor in years.
    pub tenor: f64,
    /// ATM volatility.
    pub atm: f64,
    /// 25Δ risk reversal.
    pub rr25: f64,
    /// 25Δ butterfly.
    pub bf25: f64,
    /// 10Δ risk reversal.
    pub rr10: f64,
    /// 10Δ butterfly.
    pub bf10: f64,
}

impl FxVolQuote {
    /// Wing volatilities in strike order: 10P, 25P, ATM, 25C, 10C.
    pub fn smile_vols(&self) -> [f64; 5] {
        [
            self.atm + self.bf10 - 0.5 * self.rr10,
            self.atm + self.bf25 - 0.5 * self.rr25,
            self.atm,
            self.atm + self.bf25 + 0.5 * self.rr25,
            self.atm + self.bf10 + 0.5 * self.rr10,
        ]
    }
}

#[derive(Debug, Clone)]
struct Smile {
    tenor: f64,
    strikes: [f64; 5],
    vols: [f64; 5],
    spline: CubicSplineInterpolator<f64>,
}

impl Smile {
    fn vol(&self, strike: f64) -> f64 {
        self.spline.interpolate_clamped(strike)
    }
}

/// Delta-quoted FX volatility surface.
#[derive(Debug, Clone)]
pub struct FxVolSurface {
    forward_curve: FxForwardCurve,
    convention: DeltaConvention,
    smiles: Vec<Smile>,
}

impl FxVolSurface {
    /// Build the surface from per-tenor quotes.
    ///
    /// `forward_curve` supplies the spot and outright forwards (ATM strike
    /// is the forward); `domestic` supplies the domestic discount factors
    /// needed for spot-delta conventions.
    pub fn new<C: YieldCurve>(
        quotes: &[FxVolQuote],
        forward_curve: FxForwardCurve,
        domestic: &C,
        convention: DeltaConvention,
    ) -> Result<Self, MarketDataError> {
        if quotes.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        let mut quotes = quotes.to_vec();
        quotes.sort_by(|a, b| a.tenor.total_cmp(&b.tenor));

        let mut smiles = Vec::with_capacity(quotes.len());
        for (i, q) in quotes.iter().enumerate() {
            if !(q.tenor > 0.0) || (i > 0 && q.tenor <= quotes[i - 1].tenor) {
                return Err(MarketDataError::InvalidMaturity { t: q.tenor });
            }
            let vols = q.smile_vols();
            if let Some(bad) = vols.iter().find(|v| !(**v > 0.0) || !v.is_finite()) {
                return Err(MarketDataError::InvalidVolatility { vol: *bad });
            }

            let fwd = forward_curve.forward(q.tenor)?;
            let df_d = domestic.discount_factor(q.tenor)?;
            let df_f = df_d / forward_curve.discount_factor(q.tenor)?;
            let inv = |delta: f64, is_call: bool, sigma: f64| {
                delta_to_strike(delta, is_call, sigma, q.tenor, fwd, df_f, convention)
            };
            let strikes = [
                inv(0.10, false, vols[0])?,
                inv(0.25, false, vols[1])?,
                fwd,
                inv(0.25, true, vols[3])?,
                inv(0.10, true, vols[4])?,
            ];
            if strikes.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(MarketDataError::InvalidInput(format!(
                    "smile strikes at tenor {} are not increasing: {:?}",
                    q.tenor, strikes
                )));
            }
            let spline = CubicSplineInterpolator::new(&strikes, &vols)?;
            smiles.push(Smile {
                tenor: q.tenor,
                strikes,
                vols,
                spline,
            });
        }

        Ok(Self {
            forward_curve,
            convention,
            smiles,
        })
    }

    /// FX spot.
    pub fn spot(&self) -> f64 {
        self.forward_curve.spot()
    }

    /// Delta convention the quotes were converted under.
    pub fn convention(&self) -> DeltaConvention {
        self.convention
    }

    /// Quoted tenors.
    pub fn tenors(&self) -> Vec<f64> {
        self.smiles.iter().map(|s| s.tenor).collect()
    }

    /// The forward curve used for ATM strikes.
    pub fn forward_curve(&self) -> &FxForwardCurve {
        &self.forward_curve
    }

    /// ATM strike (the outright forward) at `expiry`.
    pub fn atm_strike(&self, expiry: f64) -> Result<f64, MarketDataError> {
        self.forward_curve.forward(expiry)
    }

    /// ATM volatility at `expiry`.
    pub fn atm_volatility(&self, expiry: f64) -> Result<f64, MarketDataError> {
        let k = self.atm_strike(expiry)?;
        self.volatility(expiry, k)
    }

    /// Strikes 10P, 25P, ATM, 25C, 10C of the `index`-th tenor.
    pub fn smile_strikes(&self, index: usize) -> Option<&[f64; 5]> {
        self.smiles.get(index).map(|s| &s.strikes)
    }

    /// Volatilities 10P, 25P, ATM, 25C, 10C of the `index`-th tenor.
    pub fn smile_vols(&self, index: usize) -> Option<&[f64; 5]> {
        self.smiles.get(index).map(|s| &s.vols)
    }
}

impl FxVolSurface {
    /// Volatility of `smile` at the strike whose forward moneyness there
    /// matches that of `strike` against `forward`.
    fn smile_vol(&self, smile: &Smile, strike: f64, forward: f64) -> Result<f64, MarketDataError> {
        let moved = strike * self.forward_curve.forward(smile.tenor)? / forward;
        Ok(smile.vol(moved))
    }
}

impl VolatilitySurface for FxVolSurface {
    fn volatility(&self, expiry: f64, strike: f64) -> Result<f64, MarketDataError> {
        check_query(expiry, strike)?;
        let forward = self.forward_curve.forward(expiry)?;
        let n = self.smiles.len();
        if expiry <= self.smiles[0].tenor {
            return self.smile_vol(&self.smiles[0], strike, forward);
        }
        if expiry >= self.smiles[n - 1].tenor {
            return self.smile_vol(&self.smiles[n - 1], strike, forward);
        }
        let i = self
            .smiles
            .partition_point(|s| s.tenor <= expiry)
            .saturating_sub(1);
        let (lo, hi) = (&self.smiles[i], &self.smiles[i + 1]);
        let w_lo = self.smile_vol(lo, strike, forward)?.powi(2) * lo.tenor;
        let w_hi = self.smile_vol(hi, strike, forward)?.powi(2) * hi.tenor;
        let w = w_lo + (w_hi - w_lo) * (expiry - lo.tenor) / (hi.tenor - lo.tenor);
        if !(w >= 0.0) {
            return Err(MarketDataError::InvalidVolatility { vol: w });
        }
        Ok((w / expiry).sqrt())
    }
}

/// Strike at which an option of volatility `sigma` has the quoted absolute `delta`.
///
/// `df_f` is the foreign discount factor to `tau`, used by spot conventions.
pub fn delta_to_strike(
    delta: f64,
    is_call: bool,
    sigma: f64,
    tau: f64,
    forward: f64,
    df_f: f64,
    convention: DeltaConvention,
) -> Result<f64, MarketDataError> {
    let scale = if convention.is_spot() { df_f } else { 1.0 };
    let target = delta.abs() / scale;
    if !(target > 0.0 && target < 1.0) {
        return Err(MarketDataError::InvalidInput(format!(
            "delta {delta} is not attainable under the {convention} convention"
        )));
    }
    let sd = sigma * tau.sqrt();
    let d1 = if is_call {
        inverse_norm_cdf(target)
    } else {
        -inverse_norm_cdf(target)
    };
    let unadjusted = forward * (-d1 * sd + 0.5 * sd * sd).exp();
    if !convention.is_premium_adjusted() {
        return Ok(unadjusted);
    }

    let pa_delta = |k: f64| {
        let d2 = ((forward / k).ln() - 0.5 * sd * sd) / sd;
        let n = if is_call { norm_cdf(d2) } else { norm_cdf(-d2) };
        k / forward * n - target
    };
    let g_upper = pa_delta(unadjusted);
    if g_upper == 0.0 {
        return Ok(unadjusted);
    }
    let step = (-0.25 * sd).exp();
    let mut lower = unadjusted;
    for _ in 0..400 {
        lower *= step;
        if pa_delta(lower).signum() != g_upper.signum() {
            return Ok(BrentSolver::with_defaults().find_root(pa_delta, lower, unadjusted)?);
        }
    }
    Err(MarketDataError::InvalidInput(format!(
        "premium-adjusted delta {delta} is not attainable"
    )))
}
