//! Price plus the greeks that apply to an instrument.

use std::ops::{Add, AddAssign};

use crate::measure::RiskMeasure;

/// Bump-and-revalue greeks of one instrument.
///
/// A greek is `None` when it does not apply to the instrument, e.g. vega
/// of an FX forward or a fixed-rate bond.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::greeks::GreeksResult;
/// use pricer_pricing::measure::RiskMeasure;
///
/// let result = GreeksResult::new(10.45).with_delta(0.64).with_gamma(0.019);
/// assert_eq!(result.get(RiskMeasure::Delta), Some(0.64));
/// assert!(result.has_second_order());
/// assert!(result.vega.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GreeksResult {
    /// Present value.
    pub price: f64,

    // First-order greeks
    /// dV/dS, or dV/dr for bonds.
    pub delta: Option<f64>,
    /// dV/dσ per unit of volatility.
    pub vega: Option<f64>,
    /// dV/dt per year of calendar time.
    pub theta: Option<f64>,
    /// dV/dr per unit of rate.
    pub rho: Option<f64>,
    /// dV/dq, or dV/dr_f for FX.
    pub rho_q: Option<f64>,

    // Second-order greeks
    /// d²V/dS², or d²V/dr² for bonds.
    pub gamma: Option<f64>,
}

impl GreeksResult {
    /// Result carrying only the price.
    #[inline]
    pub fn new(price: f64) -> Self {
        Self {
            price,
            ..Default::default()
        }
    }

    /// Sets the delta.
    #[inline]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Sets the gamma.
    #[inline]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Sets the vega.
    #[inline]
    pub fn with_vega(mut self, vega: f64) -> Self {
        self.vega = Some(vega);
        self
    }

    /// Sets the theta.
    #[inline]
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }

    /// Sets the rho.
    #[inline]
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = Some(rho);
        self
    }

    /// Sets the dividend (foreign-rate) rho.
    #[inline]
    pub fn with_rho_q(mut self, rho_q: f64) -> Self {
        self.rho_q = Some(rho_q);
        self
    }

    /// Value of `measure`; `None` for measures this result does not carry.
    pub fn get(&self, measure: RiskMeasure) -> Option<f64> {
        match measure {
            RiskMeasure::Price => Some(self.price),
            RiskMeasure::Delta => self.delta,
            RiskMeasure::Gamma => self.gamma,
            RiskMeasure::Vega => self.vega,
            RiskMeasure::Theta => self.theta,
            RiskMeasure::Rho => self.rho,
            RiskMeasure::RhoQ => self.rho_q,
            _ => None,
        }
    }

    /// Whether any first-order greek is present.
    pub fn has_first_order(&self) -> bool {
        self.delta.is_some() || self.vega.is_some() || self.theta.is_some() || self.rho.is_some() || self.rho_q.is_some()
    }

    /// Whether gamma is present.
    pub fn has_second_order(&self) -> bool {
        self.gamma.is_some()
    }

    /// Every greek scaled by `factor`, e.g. a position quantity.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |g: Option<f64>| g.map(|v| v * factor);
        Self {
            price: self.price * factor,
            delta: scale(self.delta),
            vega: scale(self.vega),
            theta: scale(self.theta),
            rho: scale(self.rho),
            rho_q: scale(self.rho_q),
            gamma: scale(self.gamma),
        }
    }
}

fn add_greek(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + y),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Sums two results; a greek present on either side is kept.
impl Add for GreeksResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            price: self.price + rhs.price,
            delta: add_greek(self.delta, rhs.delta),
            vega: add_greek(self.vega, rhs.vega),
            theta: add_greek(self.theta, rhs.theta),
            rho: add_greek(self.rho, rhs.rho),
            rho_q: add_greek(self.rho_q, rhs.rho_q),
            gamma: add_greek(self.gamma, rhs.gamma),
        }
    }
}

impl AddAssign for GreeksResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
