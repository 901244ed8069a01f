//! Floating-rate notes priced off a projection curve and a discount margin.
//!
//! The coupon of the period in progress is fixed at `fixing + spread`;
//! later coupons project the simple forward of the curve over each accrual
//! period plus the spread. Discounting at a discount margin `dm` compounds
//! period by period: a flow paid at the end of period `k` is worth
//! `CF_k · Π_{j≤k} 1 / (1 + (r_j + dm)·τ_j)`, the first period running from
//! settlement only.

use pricer_core::market_data::YieldCurve;
use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use pricer_core::types::Date;
use tracing::debug;

use super::cashflows::{BondCashflows, Cashflow};
use super::error::BondError;
use super::terms::BondTerms;

/// A projected floating coupon with its reference rate and accrual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingCashflow {
    /// Payment.
    pub cashflow: Cashflow,
    /// Fixing or projected forward of the period.
    pub reference_rate: f64,
    /// Accrual fraction of the period.
    pub accrual: f64,
}

/// Floating-rate bond paying `reference + spread`, with the spread held in
/// `terms.coupon_rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingRateBond {
    terms: BondTerms,
    schedule: BondCashflows,
    current_fixing: f64,
}

impl FloatingRateBond {
    /// Builds the note with the benchmark fixing of the current period.
    pub fn new(terms: BondTerms, current_fixing: f64) -> Result<Self, BondError> {
        if !current_fixing.is_finite() {
            return Err(BondError::InvalidTerms(format!("fixing {current_fixing}")));
        }
        let schedule = BondCashflows::generate(&terms)?;
        Ok(Self {
            terms,
            schedule,
            current_fixing,
        })
    }

    /// Economic terms.
    pub fn terms(&self) -> &BondTerms {
        &self.terms
    }

    /// Quoted margin over the reference rate.
    pub fn spread(&self) -> f64 {
        self.terms.coupon_rate
    }

    /// Benchmark fixing of the current period.
    pub fn current_fixing(&self) -> f64 {
        self.current_fixing
    }

    /// Accrued interest at `settlement` on the fixed current coupon.
    pub fn accrued_interest(&self, settlement: Date) -> Result<f64, BondError> {
        let Some(p) = self.schedule.current_period(settlement) else {
            return Ok(0.0);
        };
        let dc = self.terms.day_count;
        let rate = self.current_fixing + self.spread();
        let accrued = if dc.is_actual_actual() {
            let tau = dc.year_frac(p.start, p.end).fraction;
            rate * p.outstanding * tau * (settlement - p.start) as f64 / (p.end - p.start) as f64
        } else {
            rate * p.outstanding * dc.year_frac(p.start, settlement).fraction
        };
        Ok(accrued)
    }

    /// Coupons projected from `curve` for a holder settling on `settlement`.
    pub fn projected_cashflows<C: YieldCurve>(
        &self,
        curve: &C,
        settlement: Date,
    ) -> Result<Vec<FloatingCashflow>, BondError> {
        let maturity = self.schedule.maturity();
        if settlement >= maturity {
            return Err(BondError::Expired {
                settlement: settlement.to_string(),
                limit: maturity.to_string(),
            });
        }
        let dc = self.terms.day_count;
        let mut flows = Vec::new();
        for p in self.schedule.periods().iter().filter(|p| p.end > settlement) {
            let accrual = dc.year_frac(p.start, p.end).fraction;
            let reference_rate = if p.start <= settlement || p.start < curve.anchor() {
                self.current_fixing
            } else {
                curve.fwd_rate(p.start, p.end, dc)?
            };
            flows.push(FloatingCashflow {
                cashflow: Cashflow {
                    date: p.end,
                    coupon: (reference_rate + self.spread()) * p.outstanding * accrual,
                    principal: p.principal,
                },
                reference_rate,
                accrual,
            });
        }
        Ok(flows)
    }

    /// Full price from `curve`, rebased to settlement.
    pub fn full_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        let df_settle = curve.df(settlement)?;
        let mut pv: f64 = 0.0;
        for f in self.projected_cashflows(curve, settlement)? {
            pv += f.cashflow.amount() * curve.df(f.cashflow.date)?;
        }
        Ok(pv / df_settle)
    }

    /// Clean price from `curve`.
    pub fn clean_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        Ok(self.full_price_from_curve(curve, settlement)? - self.accrued_interest(settlement)?)
    }

    /// Full price discounting projected flows at reference + `dm`.
    pub fn full_price_from_dm<C: YieldCurve>(
        &self,
        dm: f64,
        curve: &C,
        settlement: Date,
    ) -> Result<f64, BondError> {
        let legs = self.dm_legs(curve, settlement)?;
        Ok(dm_price(&legs, dm).0)
    }

    /// Clean price discounting projected flows at reference + `dm`.
    pub fn clean_price_from_dm<C: YieldCurve>(
        &self,
        dm: f64,
        curve: &C,
        settlement: Date,
    ) -> Result<f64, BondError> {
        Ok(self.full_price_from_dm(dm, curve, settlement)? - self.accrued_interest(settlement)?)
    }

    /// Discount margin reproducing `clean_price`, solved by Newton.
    pub fn discount_margin<C: YieldCurve>(
        &self,
        clean_price: f64,
        curve: &C,
        settlement: Date,
    ) -> Result<f64, BondError> {
        if !(clean_price > 0.0) || !clean_price.is_finite() {
            return Err(BondError::InvalidPrice(format!("clean price {clean_price}")));
        }
        let target = clean_price + self.accrued_interest(settlement)?;
        let legs = self.dm_legs(curve, settlement)?;
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-10, 100));
        let dm = solver.find_root_within(
            |dm| dm_price(&legs, dm).0 - target,
            |dm| dm_price(&legs, dm).1,
            self.spread(),
            -0.5,
            1.0,
        )?;
        debug!(clean_price, dm, settlement = %settlement, "solved discount margin");
        Ok(dm)
    }

    /// `(amount, reference rate, discounting accrual)` per remaining flow.
    fn dm_legs<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<Vec<(f64, f64, f64)>, BondError> {
        let dc = self.terms.day_count;
        let flows = self.projected_cashflows(curve, settlement)?;
        Ok(flows
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let tau = if i == 0 {
                    dc.year_frac(settlement, f.cashflow.date).fraction.max(0.0)
                } else {
                    f.accrual
                };
                (f.cashflow.amount(), f.reference_rate, tau)
            })
            .collect())
    }
}

/// Price and its derivative in `dm`.
fn dm_price(legs: &[(f64, f64, f64)], dm: f64) -> (f64, f64) {
    let mut discount: f64 = 1.0;
    let mut log_slope: f64 = 0.0;
    let mut price: f64 = 0.0;
    let mut derivative: f64 = 0.0;
    for (amount, rate, tau) in legs {
        let growth = 1.0 + (rate + dm) * tau;
        discount /= growth;
        log_slope += tau / growth;
        price += amount * discount;
        derivative -= amount * discount * log_slope;
    }
    (price, derivative)
}
