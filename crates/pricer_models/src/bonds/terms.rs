//! Economic terms shared by every fixed-income instrument.

use pricer_core::types::{Calendar, Date, DayCountConvention};

use super::error::BondError;
use crate::schedules::Frequency;

/// Coupon, schedule and redemption terms of a bond, per `face` of notional.
///
/// Coupons are decimal rates (`0.0325` for 3.25%). Prices elsewhere in
/// the module are quoted per 100 of face.
///
/// # Examples
///
/// ```
/// use pricer_core::types::{Date, DayCountConvention};
/// use pricer_models::bonds::BondTerms;
/// use pricer_models::schedules::Frequency;
///
/// let terms = BondTerms::new(
///     Date::from_ymd(2020, 3, 16).unwrap(),
///     Date::from_ymd(2050, 3, 16).unwrap(),
///     0.0386,
///     Frequency::SemiAnnual,
/// )
/// .with_day_count(DayCountConvention::ActualActualIsda);
/// assert!(terms.validate().is_ok());
/// assert_eq!(terms.coupon_rate_for(Date::from_ymd(2030, 3, 16).unwrap()), 0.0386);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondTerms {
    /// Interest accrual start.
    pub issue_date: Date,
    /// Final redemption date.
    pub maturity: Date,
    /// Annual coupon rate.
    pub coupon_rate: f64,
    /// Coupon frequency (`Once` for zero-coupon or bullet-interest bonds).
    pub frequency: Frequency,
    /// Accrual convention.
    pub day_count: DayCountConvention,
    /// Settlement calendar.
    pub calendar: Calendar,
    /// Business days from trade to settlement.
    pub settlement_days: u32,
    /// Business days before a coupon date on which the bond goes ex.
    pub ex_dividend_days: u32,
    /// Face amount.
    pub face: f64,
    /// Final redemption price per 100 of face.
    pub redemption: f64,
    /// Coupon resets: the rate applies to periods starting on or after the date.
    pub coupon_steps: Vec<(Date, f64)>,
    /// Early principal repayments as fractions of the original face.
    pub amortisation: Vec<(Date, f64)>,
}

impl BondTerms {
    /// Bullet bond on 100 face with ACT/ACT accrual and T+0 settlement.
    pub fn new(issue_date: Date, maturity: Date, coupon_rate: f64, frequency: Frequency) -> Self {
        Self {
            issue_date,
            maturity,
            coupon_rate,
            frequency,
            day_count: DayCountConvention::ActualActualIsda,
            calendar: Calendar::default(),
            settlement_days: 0,
            ex_dividend_days: 0,
            face: 100.0,
            redemption: 100.0,
            coupon_steps: Vec::new(),
            amortisation: Vec::new(),
        }
    }

    /// Sets the accrual day count.
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the settlement calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the settlement lag in business days.
    pub fn with_settlement_days(mut self, days: u32) -> Self {
        self.settlement_days = days;
        self
    }

    /// Sets the ex-dividend period in business days.
    pub fn with_ex_dividend_days(mut self, days: u32) -> Self {
        self.ex_dividend_days = days;
        self
    }

    /// Sets the final redemption price per 100.
    pub fn with_redemption(mut self, redemption: f64) -> Self {
        self.redemption = redemption;
        self
    }

    /// Adds a coupon reset effective for periods starting on or after `date`.
    pub fn with_coupon_step(mut self, date: Date, rate: f64) -> Self {
        self.coupon_steps.push((date, rate));
        self.coupon_steps.sort_by_key(|(d, _)| *d);
        self
    }

    /// Replaces the early-redemption schedule.
    pub fn with_amortisation(mut self, mut amortisation: Vec<(Date, f64)>) -> Self {
        amortisation.sort_by_key(|(d, _)| *d);
        self.amortisation = amortisation;
        self
    }

    /// Coupon rate of the period starting on `period_start`.
    pub fn coupon_rate_for(&self, period_start: Date) -> f64 {
        self.coupon_steps
            .iter()
            .rev()
            .find(|(d, _)| *d <= period_start)
            .map_or(self.coupon_rate, |(_, r)| *r)
    }

    /// Principal outstanding over a period starting on `period_start`.
    pub fn outstanding_at(&self, period_start: Date) -> f64 {
        let repaid: f64 = self
            .amortisation
            .iter()
            .filter(|(d, _)| *d <= period_start)
            .map(|(_, frac)| frac)
            .sum();
        self.face * (1.0 - repaid).max(0.0)
    }

    /// Coupon frequency as periods per year (1 for `Once`).
    pub fn periods_per_year(&self) -> f64 {
        self.frequency.periods_per_year().max(1) as f64
    }

    /// Settlement date for a trade on `trade_date`.
    pub fn settlement_date(&self, trade_date: Date) -> Result<Date, BondError> {
        Ok(self
            .calendar
            .add_business_days(trade_date, i64::from(self.settlement_days))?)
    }

    /// Checks the terms are internally consistent.
    ///
    /// # Errors
    ///
    /// `InvalidTerms` for a non-positive face or redemption, a non-finite
    /// coupon, issue on or after maturity, or an early-redemption schedule
    /// outside the bond's life or repaying more than the face.
    pub fn validate(&self) -> Result<(), BondError> {
        if self.issue_date >= self.maturity {
            return Err(BondError::InvalidTerms(format!(
                "issue {} not before maturity {}",
                self.issue_date, self.maturity
            )));
        }
        if !(self.face > 0.0) || !(self.redemption > 0.0) {
            return Err(BondError::InvalidTerms(format!(
                "face {} and redemption {} must be positive",
                self.face, self.redemption
            )));
        }
        if !self.coupon_rate.is_finite() || self.coupon_steps.iter().any(|(_, r)| !r.is_finite()) {
            return Err(BondError::InvalidTerms("coupon rate must be finite".to_string()));
        }
        let mut total: f64 = 0.0;
        for (date, frac) in &self.amortisation {
            if *date <= self.issue_date || *date > self.maturity {
                return Err(BondError::InvalidTerms(format!(
                    "redemption date {date} outside ({}, {}]",
                    self.issue_date, self.maturity
                )));
            }
            if !(*frac > 0.0) {
                return Err(BondError::InvalidTerms(format!(
                    "redemption fraction {frac} must be positive"
                )));
            }
            total += frac;
        }
        if total > 1.0 + 1e-9 {
            return Err(BondError::InvalidTerms(format!(
                "early redemptions repay {:.4} of face",
                total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_coupon_steps() {
        let terms = BondTerms::new(d(2020, 1, 1), d(2030, 1, 1), 0.03, Frequency::Annual)
            .with_coupon_step(d(2025, 1, 1), 0.035);
        assert_eq!(terms.coupon_rate_for(d(2024, 1, 1)), 0.03);
        assert_eq!(terms.coupon_rate_for(d(2025, 1, 1)), 0.035);
        assert_eq!(terms.coupon_rate_for(d(2029, 1, 1)), 0.035);
    }

    #[test]
    fn test_outstanding_after_amortisation() {
        let terms = BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.03, Frequency::Annual)
            .with_amortisation(vec![(d(2024, 1, 1), 0.5), (d(2023, 1, 1), 0.25)]);
        assert_eq!(terms.outstanding_at(d(2022, 1, 1)), 100.0);
        assert_eq!(terms.outstanding_at(d(2023, 1, 1)), 75.0);
        assert_eq!(terms.outstanding_at(d(2024, 1, 1)), 25.0);
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_terms() {
        let base = BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.03, Frequency::Annual);
        let mut t = base.clone();
        t.maturity = t.issue_date;
        assert!(t.validate().is_err());

        let t = base.clone().with_amortisation(vec![(d(2023, 1, 1), 0.7), (d(2024, 1, 1), 0.7)]);
        assert!(t.validate().is_err());

        let t = base.clone().with_amortisation(vec![(d(2026, 1, 1), 0.5)]);
        assert!(t.validate().is_err());

        let t = base.with_redemption(0.0);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_settlement_lag_skips_weekend() {
        // 2021-08-13 is a Friday.
        let terms = BondTerms::new(d(2020, 1, 1), d(2025, 1, 1), 0.03, Frequency::Annual)
            .with_settlement_days(1);
        assert_eq!(terms.settlement_date(d(2021, 8, 13)).unwrap(), d(2021, 8, 16));
    }
}
