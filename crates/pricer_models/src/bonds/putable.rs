//! Putable bonds with an issuer coupon-adjustment right.
//!
//! On each exercise date the issuer may reset the coupon within
//! `[c + low, c + high]`, where `c` is the coupon in force going into that
//! date, and the holder may put the bond back at the exercise price. The
//! break-even coupon `c*` reprices the residual bond, valued on the forward
//! curve from the next exercise date, to the exercise price. Two market
//! conventions turn `c*` into a decision:
//!
//! - `ChinaBond` (中债): below the band the issuer pays the floor and the
//!   holder keeps the bond; inside it the issuer pays `c*`; above it the
//!   issuer pays the cap and the holder puts.
//! - `ChinaSecurities` (中证): `c*` is clamped into the band; the holder
//!   keeps the bond only if clamping left `c*` unchanged.
//!
//! Only the next exercise date is decided; the held branch keeps its reset
//! coupon to maturity. Once every exercise date has passed the bond is a
//! plain fixed-rate bond on its stored terms, including any coupon
//! announced at a past exercise date.

use std::fmt;
use std::str::FromStr;

use pricer_core::market_data::YieldCurve;
use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use pricer_core::types::Date;
use tracing::debug;

use super::cashflows::BondCashflows;
use super::error::BondError;
use super::fixed::{FixedIncome, FixedRateBond};
use super::terms::BondTerms;

/// Market convention for the hold/put decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PutConvention {
    /// China Central Depository (中债).
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "中债"))]
    ChinaBond,
    /// China Securities Index (中证).
    #[cfg_attr(feature = "serde", serde(alias = "中证"))]
    ChinaSecurities,
}

impl PutConvention {
    /// Name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            PutConvention::ChinaBond => "ChinaBond",
            PutConvention::ChinaSecurities => "ChinaSecurities",
        }
    }
}

impl fmt::Display for PutConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PutConvention {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ChinaBond" | "中债" => Ok(PutConvention::ChinaBond),
            "ChinaSecurities" | "中证" => Ok(PutConvention::ChinaSecurities),
            other => Err(BondError::InvalidTerms(format!("unknown put convention: {other}"))),
        }
    }
}

/// Holder's rational action at the exercise date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PutDirection {
    /// Keep the bond at the adjusted coupon.
    Hold,
    /// Put the bond at the exercise price.
    Put,
}

/// Outcome of the coupon-adjustment analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PutDecision {
    /// Exercise date the decision is taken on.
    pub exercise_date: Date,
    /// Recommended action.
    pub direction: PutDirection,
    /// Coupon the issuer is expected to set.
    pub adjusted_coupon: f64,
    /// Break-even coupon `c*`.
    pub breakeven_coupon: f64,
}

/// Putable bond with a coupon-adjustment clause.
#[derive(Debug, Clone, PartialEq)]
pub struct PutableBond {
    terms: BondTerms,
    schedule: BondCashflows,
    exercise_dates: Vec<Date>,
    exercise_price: f64,
    low_adjust: f64,
    high_adjust: f64,
    convention: PutConvention,
}

impl PutableBond {
    /// Builds the bond. Exercise dates are sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// `InvalidTerms` if there is no exercise date, one lies outside the
    /// bond's life, the exercise price is not positive or
    /// `low_adjust > high_adjust`.
    pub fn new(
        terms: BondTerms,
        mut exercise_dates: Vec<Date>,
        exercise_price: f64,
        low_adjust: f64,
        high_adjust: f64,
        convention: PutConvention,
    ) -> Result<Self, BondError> {
        if exercise_dates.is_empty() {
            return Err(BondError::InvalidTerms("no exercise date".into()));
        }
        exercise_dates.sort();
        exercise_dates.dedup();
        if let Some(bad) = exercise_dates
            .iter()
            .find(|d| **d <= terms.issue_date || **d >= terms.maturity)
        {
            return Err(BondError::InvalidTerms(format!(
                "exercise date {bad} outside ({}, {})",
                terms.issue_date, terms.maturity
            )));
        }
        if !(exercise_price > 0.0) {
            return Err(BondError::InvalidTerms(format!("exercise price {exercise_price}")));
        }
        if !(low_adjust <= high_adjust) {
            return Err(BondError::InvalidTerms(format!(
                "adjustment band [{low_adjust}, {high_adjust}] is empty"
            )));
        }
        let schedule = BondCashflows::generate(&terms)?;
        Ok(Self {
            terms,
            schedule,
            exercise_dates,
            exercise_price,
            low_adjust,
            high_adjust,
            convention,
        })
    }

    /// Records the coupon the issuer announced on a past exercise date.
    ///
    /// # Errors
    ///
    /// `InvalidTerms` if `date` is not an exercise date or the rate is not
    /// finite.
    pub fn with_announced_coupon(mut self, date: Date, rate: f64) -> Result<Self, BondError> {
        if !self.exercise_dates.contains(&date) {
            return Err(BondError::InvalidTerms(format!("{date} is not an exercise date")));
        }
        if !rate.is_finite() {
            return Err(BondError::InvalidTerms(format!("announced coupon {rate}")));
        }
        self.terms.coupon_steps.retain(|(d, _)| *d != date);
        self.terms = self.terms.with_coupon_step(date, rate);
        self.schedule = BondCashflows::generate(&self.terms)?;
        Ok(self)
    }

    /// Economic terms, with announced coupons as steps.
    pub fn terms(&self) -> &BondTerms {
        &self.terms
    }

    /// Exercise dates in ascending order.
    pub fn exercise_dates(&self) -> &[Date] {
        &self.exercise_dates
    }

    /// First exercise date strictly after `settlement`.
    pub fn next_exercise(&self, settlement: Date) -> Option<Date> {
        self.exercise_dates.iter().copied().find(|d| *d > settlement)
    }

    /// Exercise price per 100.
    pub fn exercise_price(&self) -> f64 {
        self.exercise_price
    }

    /// Decision convention.
    pub fn convention(&self) -> PutConvention {
        self.convention
    }

    /// Coupon in force on `date`.
    pub fn coupon_in_force(&self, date: Date) -> f64 {
        self.terms.coupon_rate_for(date)
    }

    /// Coupon in force just before `exercise`, the base of its reset band.
    fn coupon_before(&self, exercise: Date) -> f64 {
        self.terms
            .coupon_steps
            .iter()
            .rev()
            .find(|(d, _)| *d < exercise)
            .map_or(self.terms.coupon_rate, |(_, r)| *r)
    }

    /// Coupon making the residual bond worth the exercise price on
    /// `exercise`.
    ///
    /// The residual bond is valued clean on `df(t) / df(exercise)`.
    pub fn breakeven_coupon<C: YieldCurve>(&self, curve: &C, exercise: Date) -> Result<f64, BondError> {
        let df_ex = curve.df(exercise)?;
        // Clean value is linear in the coupon: slope · c + principal value.
        let mut slope: f64 = 0.0;
        let mut principal: f64 = 0.0;
        for p in self.schedule.periods().iter().filter(|p| p.end > exercise) {
            let df = curve.df(p.end)? / df_ex;
            let mut accrual = p.outstanding * p.fraction;
            if p.contains(exercise) && exercise > p.start {
                let elapsed = (exercise - p.start) as f64 / (p.end - p.start) as f64;
                accrual *= 1.0 - elapsed;
            }
            slope += accrual * df;
            principal += p.principal * df;
        }
        let target = self.exercise_price;
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 50));
        let c_star = solver.find_root(
            |c| slope * c + principal - target,
            |_| slope,
            self.coupon_before(exercise),
        )?;
        debug!(c_star, exercise = %exercise, "solved break-even coupon");
        Ok(c_star)
    }

    /// Recommended direction, adjusted coupon and `c*` at the next exercise
    /// date for a holder settling on `settlement`; `None` once every
    /// exercise date has passed.
    pub fn decision<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<Option<PutDecision>, BondError> {
        let Some(exercise_date) = self.next_exercise(settlement) else {
            return Ok(None);
        };
        let c_star = self.breakeven_coupon(curve, exercise_date)?;
        let c = self.coupon_before(exercise_date);
        let (lo, hi) = (c + self.low_adjust, c + self.high_adjust);
        let (direction, adjusted_coupon) = match self.convention {
            PutConvention::ChinaBond => {
                if c_star < lo {
                    (PutDirection::Hold, lo)
                } else if c_star <= hi {
                    (PutDirection::Hold, c_star)
                } else {
                    (PutDirection::Put, hi)
                }
            }
            PutConvention::ChinaSecurities => {
                let clamped = c_star.clamp(lo, hi);
                let direction = if clamped == c_star {
                    PutDirection::Hold
                } else {
                    PutDirection::Put
                };
                (direction, clamped)
            }
        };
        Ok(Some(PutDecision {
            exercise_date,
            direction,
            adjusted_coupon,
            breakeven_coupon: c_star,
        }))
    }

    /// Bond realising the decided branch: the bond stepped to the adjusted
    /// coupon, or a bond redeemed at the exercise price on the exercise
    /// date. After the last exercise date it is the residual bond on the
    /// stored terms.
    pub fn branch_bond<C: YieldCurve>(
        &self,
        curve: &C,
        settlement: Date,
    ) -> Result<(Option<PutDecision>, FixedRateBond), BondError> {
        let Some(decision) = self.decision(curve, settlement)? else {
            return Ok((None, FixedRateBond::new(self.terms.clone())?));
        };
        let ex = decision.exercise_date;
        let mut terms = self.terms.clone();
        terms.coupon_steps.retain(|(d, _)| *d < ex);
        let terms = match decision.direction {
            PutDirection::Hold => terms.with_coupon_step(ex, decision.adjusted_coupon),
            PutDirection::Put => {
                terms.maturity = ex;
                terms.redemption = self.exercise_price;
                terms.amortisation.retain(|(d, _)| *d <= ex);
                terms
            }
        };
        Ok((Some(decision), FixedRateBond::new(terms)?))
    }

    /// Clean price of the decided branch from `curve`.
    pub fn clean_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        let (_, bond) = self.branch_bond(curve, settlement)?;
        bond.clean_price_from_curve(curve, settlement)
    }

    /// Full price of the decided branch from `curve`.
    pub fn full_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        let (_, bond) = self.branch_bond(curve, settlement)?;
        bond.full_price_from_curve(curve, settlement)
    }
}
