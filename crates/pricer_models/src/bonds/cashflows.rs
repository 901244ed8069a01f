//! Coupon periods, projected cash flows and accrued interest.
//!
//! Coupon dates are generated backwards from maturity, unadjusted, so a
//! short first coupon absorbs any stub. A regular period pays
//! `rate × outstanding / f`; an irregular one pays
//! `rate × outstanding × day_count(start, end)`.
//!
//! Accrued interest is the coupon share elapsed since the previous coupon
//! date: `days(start, t) / days(start, end)` of the period coupon for ACT/ACT,
//! `rate × outstanding × day_count(start, t)` otherwise. Once a bond is ex
//! (settlement on or after `ex_dividend_days` business days before the
//! coupon date) the buyer does not receive the coupon and accrued interest
//! turns negative by one full coupon.

use pricer_core::types::{BusinessDayConvention, Calendar, Date, DayCountConvention};
use tracing::trace;

use super::error::BondError;
use super::terms::BondTerms;
use crate::schedules::{DateGeneration, Frequency, ScheduleBuilder};

/// One accrual period of a bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponPeriod {
    /// Accrual start (previous coupon date or issue).
    pub start: Date,
    /// Accrual end and payment date.
    pub end: Date,
    /// Coupon rate over the period.
    pub rate: f64,
    /// Principal outstanding over the period.
    pub outstanding: f64,
    /// Accrual fraction the coupon is paid on (`1/f` for regular periods).
    pub fraction: f64,
    /// Coupon paid at `end`.
    pub coupon: f64,
    /// Principal repaid at `end`.
    pub principal: f64,
}

impl CouponPeriod {
    /// True when `date` lies in `[start, end)`.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }
}

/// A dated payment to the holder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cashflow {
    /// Payment date.
    pub date: Date,
    /// Interest component.
    pub coupon: f64,
    /// Principal component.
    pub principal: f64,
}

impl Cashflow {
    /// Coupon plus principal.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.coupon + self.principal
    }
}

/// Generated coupon periods of a bond together with its accrual conventions.
#[derive(Debug, Clone, PartialEq)]
pub struct BondCashflows {
    periods: Vec<CouponPeriod>,
    maturity: Date,
    day_count: DayCountConvention,
    calendar: Calendar,
    ex_dividend_days: u32,
}

impl BondCashflows {
    /// Generates the coupon periods of `terms`.
    ///
    /// # Errors
    ///
    /// `InvalidTerms` if the terms fail validation or an early redemption
    /// does not fall on a coupon date; schedule errors are propagated.
    pub fn generate(terms: &BondTerms) -> Result<Self, BondError> {
        terms.validate()?;
        let schedule = ScheduleBuilder::new()
            .start(terms.issue_date)
            .end(terms.maturity)
            .frequency(terms.frequency)
            .calendar(terms.calendar.clone())
            .business_day_convention(BusinessDayConvention::Unadjusted)
            .generation(DateGeneration::Backward)
            .day_count(terms.day_count)
            .end_of_month(terms.maturity.is_end_of_month())
            .build()?;
        let dates = schedule.dates();

        if let Some((date, _)) = terms.amortisation.iter().find(|(d, _)| !dates.contains(d)) {
            return Err(BondError::InvalidTerms(format!(
                "early redemption on {date} is not a coupon date"
            )));
        }

        let f = terms.periods_per_year();
        let last = dates.len() - 1;
        let periods = dates
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let (start, end) = (w[0], w[1]);
                let rate = terms.coupon_rate_for(start);
                let outstanding = terms.outstanding_at(start);
                let fraction = if is_regular(start, end, terms.frequency) {
                    1.0 / f
                } else {
                    terms.day_count.year_frac(start, end).fraction
                };
                let principal = if i + 1 == last {
                    outstanding * terms.redemption / 100.0
                } else {
                    terms
                        .amortisation
                        .iter()
                        .filter(|(d, _)| *d == end)
                        .map(|(_, frac)| frac * terms.face)
                        .sum()
                };
                CouponPeriod {
                    start,
                    end,
                    rate,
                    outstanding,
                    fraction,
                    coupon: rate * outstanding * fraction,
                    principal,
                }
            })
            .collect::<Vec<_>>();
        trace!(periods = periods.len(), maturity = %terms.maturity, "generated coupon periods");

        Ok(Self {
            periods,
            maturity: terms.maturity,
            day_count: terms.day_count,
            calendar: terms.calendar.clone(),
            ex_dividend_days: terms.ex_dividend_days,
        })
    }

    /// All coupon periods, issue to maturity.
    pub fn periods(&self) -> &[CouponPeriod] {
        &self.periods
    }

    /// Accrual day count.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Final payment date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Period whose accrual contains `date`.
    pub fn current_period(&self, date: Date) -> Option<&CouponPeriod> {
        self.periods.iter().find(|p| p.contains(date))
    }

    /// Last coupon date on or before `date` (issue date counts).
    pub fn previous_coupon_date(&self, date: Date) -> Option<Date> {
        self.current_period(date).map(|p| p.start)
    }

    /// First coupon date after `date`.
    pub fn next_coupon_date(&self, date: Date) -> Option<Date> {
        self.periods.iter().map(|p| p.end).find(|d| *d > date)
    }

    /// Ex-dividend date of the coupon paid on `coupon_date`.
    pub fn ex_dividend_date(&self, coupon_date: Date) -> Result<Date, BondError> {
        if self.ex_dividend_days == 0 {
            return Ok(coupon_date);
        }
        Ok(self
            .calendar
            .add_business_days(coupon_date, -i64::from(self.ex_dividend_days))?)
    }

    /// True when a trade settling on `settlement` does not receive the next coupon.
    pub fn is_ex_dividend(&self, settlement: Date) -> Result<bool, BondError> {
        if self.ex_dividend_days == 0 {
            return Ok(false);
        }
        match self.current_period(settlement) {
            Some(p) => Ok(settlement >= self.ex_dividend_date(p.end)?),
            None => Ok(false),
        }
    }

    /// Accrued interest at `settlement`, per the bond's face.
    ///
    /// Zero before issue and on coupon dates.
    pub fn accrued_interest(&self, settlement: Date) -> Result<f64, BondError> {
        let Some(period) = self.current_period(settlement) else {
            return Ok(0.0);
        };
        let accrued = if self.day_count.is_actual_actual() {
            let elapsed = (settlement - period.start) as f64;
            let length = (period.end - period.start) as f64;
            period.coupon * elapsed / length
        } else {
            period.rate * period.outstanding * self.day_count.year_frac(period.start, settlement).fraction
        };
        if self.is_ex_dividend(settlement)? {
            Ok(accrued - period.coupon)
        } else {
            Ok(accrued)
        }
    }

    /// Cash flows received by a holder settling on `settlement`.
    ///
    /// # Errors
    ///
    /// `Expired` if `settlement` is on or after maturity.
    pub fn remaining(&self, settlement: Date) -> Result<Vec<Cashflow>, BondError> {
        let maturity = self.maturity();
        if settlement >= maturity {
            return Err(BondError::Expired {
                settlement: settlement.to_string(),
                limit: maturity.to_string(),
            });
        }
        let ex = self.is_ex_dividend(settlement)?;
        let mut flows = Vec::new();
        for p in self.periods.iter().filter(|p| p.end > settlement) {
            let coupon = if ex && p.contains(settlement) { 0.0 } else { p.coupon };
            if coupon == 0.0 && p.principal == 0.0 {
                continue;
            }
            flows.push(Cashflow {
                date: p.end,
                coupon,
                principal: p.principal,
            });
        }
        Ok(flows)
    }
}

/// True when `[start, end]` spans exactly one coupon tenor.
fn is_regular(start: Date, end: Date, frequency: Frequency) -> bool {
    if let Some(months) = frequency.tenor_months() {
        let Ok(back) = end.add_months(-(months as i32)) else {
            return false;
        };
        back == start
            || (back.is_end_of_month()
                && start.is_end_of_month()
                && back.year() == start.year()
                && back.month() == start.month())
    } else if let Some(days) = frequency.tenor_days() {
        end - start == days
    } else {
        false
    }
}
