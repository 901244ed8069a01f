//! Bond instruments: contract terms plus the market handles they price on.
//!
//! Each instrument builds the matching cash-flow engine from
//! [`crate::bonds`] on demand.

use pricer_core::types::Date;

use super::error::InstrumentError;
use super::market::{CurveRef, MarketAttributes};
use super::payoff::OptionType;
use crate::bonds::{
    AdvanceRedemptionBond, BondOption, BondTerms, FixedRateBond, FloatingRateBond, PutConvention, PutableBond,
    YieldConvention,
};

/// Fixed-coupon bond.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{CurveRef, FixedBond};
/// use pricer_models::bonds::BondTerms;
/// use pricer_models::schedules::Frequency;
///
/// let terms = BondTerms::new(
///     Date::from_ymd(2020, 3, 16).unwrap(),
///     Date::from_ymd(2050, 3, 16).unwrap(),
///     0.0339,
///     Frequency::SemiAnnual,
/// );
/// let bond = FixedBond::new("200007.IB", terms, CurveRef::BondYield("CBD100311".into()));
/// assert!(bond.build().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedBond {
    /// Bond code.
    pub symbol: String,
    /// Contract terms.
    pub terms: BondTerms,
    /// Discount curve.
    pub curve: CurveRef,
    /// Convention for yield measures.
    pub yield_convention: YieldConvention,
    /// Pinned clean price or yield.
    pub market: MarketAttributes,
}

impl FixedBond {
    /// Bond with compounded yields and nothing pinned.
    pub fn new(symbol: impl Into<String>, terms: BondTerms, curve: CurveRef) -> Self {
        Self {
            symbol: symbol.into(),
            terms,
            curve,
            yield_convention: YieldConvention::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Sets the yield convention.
    pub fn with_yield_convention(mut self, convention: YieldConvention) -> Self {
        self.yield_convention = convention;
        self
    }

    /// Pins market inputs.
    pub fn with_market(mut self, market: MarketAttributes) -> Self {
        self.market = market;
        self
    }

    /// Cash-flow engine.
    pub fn build(&self) -> Result<FixedRateBond, InstrumentError> {
        Ok(FixedRateBond::new(self.terms.clone())?)
    }
}

/// Floating-rate note paying a fixing plus `terms.coupon_rate` as spread.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingBond {
    /// Bond code.
    pub symbol: String,
    /// Contract terms; `coupon_rate` is the quoted spread.
    pub terms: BondTerms,
    /// Benchmark fixing for the current period.
    pub current_fixing: f64,
    /// Projection and discount curve.
    pub curve: CurveRef,
    /// Pinned clean price.
    pub market: MarketAttributes,
}

impl FloatingBond {
    /// Floater projected and discounted on `curve`.
    pub fn new(symbol: impl Into<String>, terms: BondTerms, current_fixing: f64, curve: CurveRef) -> Self {
        Self {
            symbol: symbol.into(),
            terms,
            current_fixing,
            curve,
            market: MarketAttributes::default(),
        }
    }

    /// Cash-flow engine.
    pub fn build(&self) -> Result<FloatingRateBond, InstrumentError> {
        Ok(FloatingRateBond::new(self.terms.clone(), self.current_fixing)?)
    }
}

/// Amortising bond repaying principal ahead of maturity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvanceRedemption {
    /// Bond code.
    pub symbol: String,
    /// Contract terms.
    pub terms: BondTerms,
    /// Instalments as (coupon date, fraction of original face).
    pub redemptions: Vec<(Date, f64)>,
    /// Discount curve.
    pub curve: CurveRef,
    /// Convention for yield measures.
    pub yield_convention: YieldConvention,
    /// Pinned clean price or yield.
    pub market: MarketAttributes,
}

impl AdvanceRedemption {
    /// Amortising bond with compounded yields.
    pub fn new(symbol: impl Into<String>, terms: BondTerms, redemptions: Vec<(Date, f64)>, curve: CurveRef) -> Self {
        Self {
            symbol: symbol.into(),
            terms,
            redemptions,
            curve,
            yield_convention: YieldConvention::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Cash-flow engine.
    pub fn build(&self) -> Result<AdvanceRedemptionBond, InstrumentError> {
        Ok(AdvanceRedemptionBond::new(self.terms.clone(), self.redemptions.clone())?)
    }
}

/// Bond with a holder put and an issuer coupon reset on each exercise date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PutableAdjustableBond {
    /// Bond code.
    pub symbol: String,
    /// Contract terms.
    pub terms: BondTerms,
    /// Exercise (reset and put) dates.
    pub exercise_dates: Vec<Date>,
    /// Coupons announced on past exercise dates.
    #[cfg_attr(feature = "serde", serde(default))]
    pub announced_coupons: Vec<(Date, f64)>,
    /// Put price per 100.
    pub exercise_price: f64,
    /// Lower edge of the reset band relative to the coupon.
    pub low_adjust: f64,
    /// Upper edge of the reset band relative to the coupon.
    pub high_adjust: f64,
    /// Market convention deciding hold or put.
    pub convention: PutConvention,
    /// Discount curve.
    pub curve: CurveRef,
    /// Convention for yield measures.
    pub yield_convention: YieldConvention,
    /// Pinned clean price or yield.
    pub market: MarketAttributes,
}

impl PutableAdjustableBond {
    /// Putable bond put at par with a symmetric band.
    pub fn new(symbol: impl Into<String>, terms: BondTerms, exercise_date: Date, band: f64, curve: CurveRef) -> Self {
        Self {
            symbol: symbol.into(),
            terms,
            exercise_dates: vec![exercise_date],
            announced_coupons: Vec::new(),
            exercise_price: 100.0,
            low_adjust: -band,
            high_adjust: band,
            convention: PutConvention::default(),
            curve,
            yield_convention: YieldConvention::default(),
            market: MarketAttributes::default(),
        }
    }

    /// Sets the decision convention.
    pub fn with_convention(mut self, convention: PutConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Replaces the exercise dates.
    pub fn with_exercise_dates(mut self, dates: Vec<Date>) -> Self {
        self.exercise_dates = dates;
        self
    }

    /// Records the coupon announced on a past exercise date.
    pub fn with_announced_coupon(mut self, date: Date, rate: f64) -> Self {
        self.announced_coupons.push((date, rate));
        self
    }

    /// Decision engine.
    pub fn build(&self) -> Result<PutableBond, InstrumentError> {
        let mut bond = PutableBond::new(
            self.terms.clone(),
            self.exercise_dates.clone(),
            self.exercise_price,
            self.low_adjust,
            self.high_adjust,
            self.convention,
        )?;
        for &(date, rate) in &self.announced_coupons {
            bond = bond.with_announced_coupon(date, rate)?;
        }
        Ok(bond)
    }
}

/// European option on a fixed-rate bond, struck on the clean price.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuropeanBondOption {
    /// Underlying bond.
    pub bond: FixedBond,
    /// Expiry.
    pub expiry: Date,
    /// Clean strike per 100.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Face amount in units of 100.
    pub notional: f64,
    /// Pinned price volatility.
    pub market: MarketAttributes,
}

impl EuropeanBondOption {
    /// One-lot option.
    pub fn new(bond: FixedBond, expiry: Date, strike: f64, option_type: OptionType) -> Self {
        Self {
            bond,
            expiry,
            strike,
            option_type,
            notional: 1.0,
            market: MarketAttributes::default(),
        }
    }

    /// Black-76 engine.
    pub fn build(&self) -> Result<BondOption, InstrumentError> {
        if !(self.strike > 0.0) {
            return Err(InstrumentError::InvalidStrike { strike: self.strike });
        }
        Ok(BondOption::new(self.bond.build()?, self.expiry, self.strike, self.option_type)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::equal_instalments;
    use crate::schedules::Frequency;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn terms() -> BondTerms {
        BondTerms::new(d(2021, 10, 29), d(2028, 10, 29), 0.0477, Frequency::Annual)
    }

    #[test]
    fn test_builds() {
        let curve = CurveRef::BondYield("CBD100461".into());
        assert!(FixedBond::new("A", terms(), curve.clone()).build().is_ok());
        assert!(FloatingBond::new("B", terms(), 0.024, curve.clone()).build().is_ok());
        let instalments = equal_instalments(d(2024, 10, 29), 5, Frequency::Annual).unwrap();
        assert!(AdvanceRedemption::new("C", terms(), instalments, curve.clone()).build().is_ok());
        assert!(AdvanceRedemption::new("C", terms(), Vec::new(), curve).build().is_err());
    }

    #[test]
    fn test_putable_band() {
        let bond = PutableAdjustableBond::new("D", terms(), d(2024, 10, 29), 0.03, CurveRef::default());
        assert_eq!(bond.low_adjust, -0.03);
        assert_eq!(bond.convention, PutConvention::ChinaBond);
        assert!(bond.build().is_ok());
        let late = PutableAdjustableBond::new("D", terms(), d(2029, 1, 1), 0.03, CurveRef::default());
        assert!(matches!(late.build(), Err(InstrumentError::Bond(_))));

        let stepped = bond
            .clone()
            .with_exercise_dates(vec![d(2024, 10, 29), d(2026, 10, 29)])
            .with_announced_coupon(d(2024, 10, 29), 0.035)
            .build()
            .unwrap();
        assert_eq!(stepped.exercise_dates().len(), 2);
        assert_eq!(stepped.coupon_in_force(d(2025, 1, 1)), 0.035);
        let off_date = bond.with_announced_coupon(d(2025, 10, 29), 0.035);
        assert!(off_date.build().is_err());
    }

    #[test]
    fn test_bond_option_strike() {
        let bond = FixedBond::new("A", terms(), CurveRef::default());
        let opt = EuropeanBondOption::new(bond.clone(), d(2023, 1, 1), 100.0, OptionType::Call);
        assert!(opt.build().is_ok());
        let bad = EuropeanBondOption::new(bond, d(2023, 1, 1), 0.0, OptionType::Call);
        assert!(matches!(bad.build(), Err(InstrumentError::InvalidStrike { .. })));
    }
}
