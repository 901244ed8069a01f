//! The closed set of quantities a [`Pricer`](crate::pricers::Pricer) computes.

use std::fmt;
use std::str::FromStr;

use pricer_core::types::PricingError;
use serde::{Deserialize, Serialize};

/// A risk measure.
///
/// Greeks apply to every asset class and bump whichever input the class
/// is driven by. The remaining measures are bond analytics per 100 face.
///
/// # Examples
/// ```
/// use pricer_pricing::measure::RiskMeasure;
///
/// let m: RiskMeasure = "dv01".parse().unwrap();
/// assert_eq!(m, RiskMeasure::Dv01);
/// assert_eq!(m.to_string(), "DV01");
/// assert!(RiskMeasure::RhoQ.is_greek());
/// assert!(!RiskMeasure::Ytm.is_greek());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskMeasure {
    /// Present value.
    Price,
    /// dV/dS.
    Delta,
    /// d²V/dS².
    Gamma,
    /// dV/dσ.
    Vega,
    /// dV/dt per year, one business day forward.
    Theta,
    /// dV/dr on the discount curve.
    Rho,
    /// dV/dq, or the foreign rate for FX.
    RhoQ,
    /// Clean price plus accrued.
    FullPrice,
    /// Clean price off the curve.
    CleanPrice,
    /// Accrued interest at settlement.
    AccruedInterest,
    /// Yield to maturity.
    Ytm,
    /// Price change for a 1 bp fall in yield.
    Dv01,
    /// DV01 × 10⁴.
    DollarDuration,
    /// Convexity × full price.
    DollarConvexity,
    /// Modified duration by finite difference.
    ModifiedDuration,
    /// Modified duration in closed form.
    ModifiedDurationAnalytic,
    /// Macaulay duration in years.
    MacaulayDuration,
    /// Yield convexity.
    Convexity,
    /// Floating-rate discount margin.
    DiscountMargin,
    /// Coupon a putable bond's issuer is expected to set.
    AdjustedCoupon,
}

impl RiskMeasure {
    /// Every measure, greeks first.
    pub const ALL: [RiskMeasure; 20] = [
        RiskMeasure::Price,
        RiskMeasure::Delta,
        RiskMeasure::Gamma,
        RiskMeasure::Vega,
        RiskMeasure::Theta,
        RiskMeasure::Rho,
        RiskMeasure::RhoQ,
        RiskMeasure::FullPrice,
        RiskMeasure::CleanPrice,
        RiskMeasure::AccruedInterest,
        RiskMeasure::Ytm,
        RiskMeasure::Dv01,
        RiskMeasure::DollarDuration,
        RiskMeasure::DollarConvexity,
        RiskMeasure::ModifiedDuration,
        RiskMeasure::ModifiedDurationAnalytic,
        RiskMeasure::MacaulayDuration,
        RiskMeasure::Convexity,
        RiskMeasure::DiscountMargin,
        RiskMeasure::AdjustedCoupon,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            RiskMeasure::Price => "Price",
            RiskMeasure::Delta => "Delta",
            RiskMeasure::Gamma => "Gamma",
            RiskMeasure::Vega => "Vega",
            RiskMeasure::Theta => "Theta",
            RiskMeasure::Rho => "Rho",
            RiskMeasure::RhoQ => "RhoQ",
            RiskMeasure::FullPrice => "FullPrice",
            RiskMeasure::CleanPrice => "CleanPrice",
            RiskMeasure::AccruedInterest => "AccruedInterest",
            RiskMeasure::Ytm => "YTM",
            RiskMeasure::Dv01 => "DV01",
            RiskMeasure::DollarDuration => "DollarDuration",
            RiskMeasure::DollarConvexity => "DollarConvexity",
            RiskMeasure::ModifiedDuration => "ModifiedDuration",
            RiskMeasure::ModifiedDurationAnalytic => "ModifiedDurationAnalytic",
            RiskMeasure::MacaulayDuration => "MacaulayDuration",
            RiskMeasure::Convexity => "Convexity",
            RiskMeasure::DiscountMargin => "DiscountMargin",
            RiskMeasure::AdjustedCoupon => "AdjustedCoupon",
        }
    }

    /// Whether the measure is a bump-and-revalue sensitivity.
    #[inline]
    pub fn is_greek(&self) -> bool {
        matches!(
            self,
            RiskMeasure::Delta
                | RiskMeasure::Gamma
                | RiskMeasure::Vega
                | RiskMeasure::Theta
                | RiskMeasure::Rho
                | RiskMeasure::RhoQ
        )
    }
}

impl FromStr for RiskMeasure {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_uppercase().replace(['_', ' ', '-'], "");
        let alias = match key.as_str() {
            "PV" | "NPV" | "VALUE" => Some(RiskMeasure::Price),
            "PSI" | "RHOQ" | "DIVRHO" => Some(RiskMeasure::RhoQ),
            "DIRTYPRICE" => Some(RiskMeasure::FullPrice),
            "ACCRUED" => Some(RiskMeasure::AccruedInterest),
            "YIELD" => Some(RiskMeasure::Ytm),
            "DM" => Some(RiskMeasure::DiscountMargin),
            _ => None,
        };
        alias
            .or_else(|| RiskMeasure::ALL.into_iter().find(|m| m.name().to_uppercase() == key))
            .ok_or_else(|| PricingError::InvalidConfiguration(format!("unknown risk measure: {s}")))
    }
}

impl fmt::Display for RiskMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
