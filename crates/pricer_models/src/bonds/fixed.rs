//! Fixed-coupon bonds and their price/yield analytics.

use pricer_core::market_data::YieldCurve;
use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use pricer_core::types::Date;
use tracing::debug;

use super::cashflows::{BondCashflows, Cashflow};
use super::error::BondError;
use super::terms::BondTerms;
use super::yields::{YieldConvention, YieldDiscounting};

/// Yield bump for finite-difference risk (1 bp).
pub const YIELD_BUMP: f64 = 1e-4;

/// Yield-based risk figures at a market clean price, per 100 face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondAnalytics {
    /// Yield to maturity.
    pub ytm: f64,
    /// Clean price.
    pub clean_price: f64,
    /// Full (dirty) price.
    pub full_price: f64,
    /// Accrued interest.
    pub accrued_interest: f64,
    /// Full-price change for a 1 bp fall in yield.
    pub dv01: f64,
    /// Modified duration by finite difference.
    pub modified_duration: f64,
    /// Modified duration from the analytic price derivative.
    pub modified_duration_analytic: f64,
    /// Macaulay duration in years.
    pub macaulay_duration: f64,
    /// Convexity by finite difference.
    pub convexity: f64,
    /// Full-price change per unit yield (`DV01 × 10⁴`).
    pub dollar_duration: f64,
    /// `convexity × full price`.
    pub dollar_convexity: f64,
}

/// Bonds whose cash flows are known at settlement.
///
/// Implementors supply their terms and generated periods; pricing from a
/// curve or a yield, the yield solve and the risk figures are shared.
pub trait FixedIncome {
    /// Economic terms.
    fn terms(&self) -> &BondTerms;

    /// Generated coupon periods.
    fn schedule(&self) -> &BondCashflows;

    /// Settlement date for a trade on `trade_date`.
    fn settlement_date(&self, trade_date: Date) -> Result<Date, BondError> {
        self.terms().settlement_date(trade_date)
    }

    /// Flows received by a buyer settling on `settlement`.
    fn cashflows(&self, settlement: Date) -> Result<Vec<Cashflow>, BondError> {
        self.schedule().remaining(settlement)
    }

    /// Accrued interest per the bond's face.
    fn accrued_interest(&self, settlement: Date) -> Result<f64, BondError> {
        self.schedule().accrued_interest(settlement)
    }

    /// Full price from a discount curve, discounted to settlement.
    fn full_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError>
    where
        Self: Sized,
    {
        let df_settle = curve.df(settlement)?;
        let mut pv: f64 = 0.0;
        for cf in self.cashflows(settlement)? {
            pv += cf.amount() * curve.df(cf.date)?;
        }
        Ok(pv / df_settle)
    }

    /// Clean price from a discount curve.
    fn clean_price_from_curve<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError>
    where
        Self: Sized,
    {
        Ok(self.full_price_from_curve(curve, settlement)? - self.accrued_interest(settlement)?)
    }

    /// Full price at yield `ytm`.
    fn full_price_from_yield(
        &self,
        ytm: f64,
        settlement: Date,
        convention: YieldConvention,
    ) -> Result<f64, BondError> {
        Ok(discounting(self, settlement, convention)?.price(ytm))
    }

    /// Clean price at yield `ytm`.
    fn clean_price_from_yield(
        &self,
        ytm: f64,
        settlement: Date,
        convention: YieldConvention,
    ) -> Result<f64, BondError> {
        Ok(self.full_price_from_yield(ytm, settlement, convention)? - self.accrued_interest(settlement)?)
    }

    /// Yield reproducing `clean_price`, solved by Newton on the full price.
    ///
    /// # Errors
    ///
    /// `InvalidPrice` for a non-positive price; `Solver` if Newton fails.
    fn ytm(&self, clean_price: f64, settlement: Date, convention: YieldConvention) -> Result<f64, BondError> {
        if !(clean_price > 0.0) || !clean_price.is_finite() {
            return Err(BondError::InvalidPrice(format!("clean price {clean_price}")));
        }
        let target = clean_price + self.accrued_interest(settlement)?;
        let disc = discounting(self, settlement, convention)?;
        let guess = if self.terms().coupon_rate > 0.0 {
            self.terms().coupon_rate
        } else {
            0.03
        };
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-10, 100));
        let y = solver.find_root_within(
            |y| disc.price(y) - target,
            |y| disc.derivative(y),
            guess,
            disc.lower_bound(),
            10.0,
        )?;
        debug!(clean_price, ytm = y, settlement = %settlement, "solved yield to maturity");
        Ok(y)
    }

    /// Risk figures at the yield implied by `clean_price`.
    fn analytics(
        &self,
        clean_price: f64,
        settlement: Date,
        convention: YieldConvention,
    ) -> Result<BondAnalytics, BondError> {
        let y = self.ytm(clean_price, settlement, convention)?;
        let disc = discounting(self, settlement, convention)?;
        let accrued = self.accrued_interest(settlement)?;
        let full = disc.price(y);
        let up = disc.price(y + YIELD_BUMP);
        let down = disc.price(y - YIELD_BUMP);

        let dv01 = (down - up) / 2.0;
        let modified = dv01 / full * 1e4;
        let convexity = (up + down - 2.0 * full) / (full * YIELD_BUMP * YIELD_BUMP);
        let f = self.terms().periods_per_year();
        Ok(BondAnalytics {
            ytm: y,
            clean_price: full - accrued,
            full_price: full,
            accrued_interest: accrued,
            dv01,
            modified_duration: modified,
            modified_duration_analytic: disc.macaulay(y) / (1.0 + y / f),
            macaulay_duration: modified * (1.0 + y / f),
            convexity,
            dollar_duration: dv01 * 1e4,
            dollar_convexity: convexity * full,
        })
    }
}

fn discounting<B: FixedIncome + ?Sized>(
    bond: &B,
    settlement: Date,
    convention: YieldConvention,
) -> Result<YieldDiscounting, BondError> {
    YieldDiscounting::new(bond.schedule(), settlement, bond.terms().periods_per_year(), convention)
}

/// A bond paying fixed (possibly stepped) coupons with optional amortisation.
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::bonds::{BondTerms, FixedIncome, FixedRateBond, YieldConvention};
/// use pricer_models::schedules::Frequency;
///
/// let terms = BondTerms::new(
///     Date::from_ymd(2020, 1, 1).unwrap(),
///     Date::from_ymd(2030, 1, 1).unwrap(),
///     0.04,
///     Frequency::Annual,
/// );
/// let bond = FixedRateBond::new(terms).unwrap();
/// let settle = Date::from_ymd(2021, 1, 1).unwrap();
/// let y = bond.ytm(100.0, settle, YieldConvention::UsStreet).unwrap();
/// assert!((y - 0.04).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateBond {
    terms: BondTerms,
    schedule: BondCashflows,
}

impl FixedRateBond {
    /// Builds the bond and its coupon schedule.
    pub fn new(terms: BondTerms) -> Result<Self, BondError> {
        let schedule = BondCashflows::generate(&terms)?;
        Ok(Self { terms, schedule })
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        self.terms.maturity
    }
}

impl FixedIncome for FixedRateBond {
    fn terms(&self) -> &BondTerms {
        &self.terms
    }

    fn schedule(&self) -> &BondCashflows {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedules::Frequency;
    use approx::assert_relative_eq;
    use pricer_core::market_data::{Compounding, ZeroCurve};
    use pricer_core::types::DayCountConvention;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn long_bond() -> FixedRateBond {
        let terms = BondTerms::new(d(2020, 3, 16), d(2050, 3, 16), 0.0339, Frequency::SemiAnnual)
            .with_day_count(DayCountConvention::ActualActualIsda);
        FixedRateBond::new(terms).unwrap()
    }

    #[test]
    fn test_long_bond_yield_and_duration() {
        let bond = long_bond();
        let settle = d(2021, 12, 27);
        let a = bond.analytics(99.1455, settle, YieldConvention::Compounded).unwrap();
        assert_relative_eq!(a.ytm, 0.0343, epsilon = 1e-3);
        assert!(a.dv01 > 0.0);
        assert_relative_eq!(a.modified_duration, 17.7, epsilon = 0.5);
        assert_relative_eq!(a.modified_duration, a.modified_duration_analytic, max_relative = 1e-4);
        assert!(a.convexity > 0.0);
        assert_relative_eq!(a.clean_price, 99.1455, epsilon = 1e-8);
        assert_relative_eq!(a.dollar_duration, a.dv01 * 1e4, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_price_matches_flat_yield() {
        let terms = BondTerms::new(d(2021, 1, 1), d(2026, 1, 1), 0.05, Frequency::Annual)
            .with_day_count(DayCountConvention::Actual365Fixed);
        let bond = FixedRateBond::new(terms).unwrap();
        let settle = d(2021, 1, 1);
        let curve = ZeroCurve::flat(settle, 0.05, Compounding::Periodic(1)).unwrap();
        let from_curve = bond.full_price_from_curve(&curve, settle).unwrap();
        let from_yield = bond
            .full_price_from_yield(0.05, settle, YieldConvention::Compounded)
            .unwrap();
        assert_relative_eq!(from_curve, from_yield, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_price_rebased_to_settlement() {
        let bond = long_bond();
        let anchor = d(2021, 12, 27);
        let curve = ZeroCurve::flat(anchor, 0.03, Compounding::Continuous).unwrap();
        let settle = d(2021, 12, 28);
        let full = bond.full_price_from_curve(&curve, settle).unwrap();
        let df = curve.df(settle).unwrap();
        let pv: f64 = bond
            .cashflows(settle)
            .unwrap()
            .iter()
            .map(|cf| cf.amount() * curve.df(cf.date).unwrap())
            .sum();
        assert_relative_eq!(full, pv / df, epsilon = 1e-10);
        let clean = bond.clean_price_from_curve(&curve, settle).unwrap();
        assert_relative_eq!(full - clean, bond.accrued_interest(settle).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_ytm_rejects_bad_price() {
        let bond = long_bond();
        assert!(matches!(
            bond.ytm(-1.0, d(2021, 12, 27), YieldConvention::Compounded),
            Err(BondError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_expired_bond() {
        let bond = long_bond();
        assert!(matches!(
            bond.ytm(100.0, d(2050, 3, 16), YieldConvention::Compounded),
            Err(BondError::Expired { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_ytm_round_trip(y in -0.01f64..0.15, day in 0i64..3000) {
            let bond = long_bond();
            let settle = d(2020, 3, 16).add_days(day).unwrap();
            for conv in [YieldConvention::Compounded, YieldConvention::UsStreet, YieldConvention::UkDmo] {
                let clean = bond.clean_price_from_yield(y, settle, conv).unwrap();
                let solved = bond.ytm(clean, settle, conv).unwrap();
                prop_assert!((solved - y).abs() < 1e-8);
            }
        }
    }
}
