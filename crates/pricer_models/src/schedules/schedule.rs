//! Schedule and ScheduleBuilder implementation.

use super::error::ScheduleError;
use super::frequency::Frequency;
use super::period::Period;
use pricer_core::types::calendar::Calendar;
use pricer_core::types::time::{BusinessDayConvention, Date, DayCountConvention};
use std::fmt;
use std::str::FromStr;

/// Direction in which regular dates are rolled out.
///
/// Any short stub lands on the side the generation finishes on:
/// `Backward` rolls from the end date and leaves the stub at the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateGeneration {
    /// Roll forward from the start date; stub at the end.
    Forward,
    /// Roll backward from the end date; stub at the start.
    #[default]
    Backward,
}

impl fmt::Display for DateGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateGeneration::Forward => write!(f, "Forward"),
            DateGeneration::Backward => write!(f, "Backward"),
        }
    }
}

impl FromStr for DateGeneration {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(DateGeneration::Forward),
            "backward" => Ok(DateGeneration::Backward),
            _ => Err(ScheduleError::UnknownGeneration(s.to_string())),
        }
    }
}

/// An ordered set of adjusted schedule dates and the periods between them.
///
/// The first date is the (adjusted) start and the last the (adjusted) end.
/// Dates are strictly increasing.
///
/// # Examples
///
/// ```
/// use pricer_models::schedules::{Frequency, ScheduleBuilder};
/// use pricer_core::types::time::{Date, DayCountConvention};
///
/// let schedule = ScheduleBuilder::new()
///     .start(Date::from_ymd(2024, 1, 15).unwrap())
///     .end(Date::from_ymd(2026, 1, 15).unwrap())
///     .frequency(Frequency::SemiAnnual)
///     .day_count(DayCountConvention::Actual360)
///     .build()
///     .unwrap();
///
/// assert_eq!(schedule.periods().len(), 4);
/// assert_eq!(schedule.dates().len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    dates: Vec<Date>,
    unadjusted: Vec<Date>,
    periods: Vec<Period>,
}

impl Schedule {
    fn from_dates(
        dates: Vec<Date>,
        unadjusted: Vec<Date>,
        day_count: DayCountConvention,
    ) -> Result<Self, ScheduleError> {
        if dates.len() < 2 {
            let start = dates.first().copied().ok_or(ScheduleError::MissingField { field: "start" })?;
            return Err(ScheduleError::NoPeriods { start, end: start });
        }
        let periods = dates
            .windows(2)
            .map(|w| Period::new(w[0], w[1], w[1], day_count))
            .collect();
        Ok(Self {
            dates,
            unadjusted,
            periods,
        })
    }

    /// Adjusted dates, boundaries included.
    #[inline]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Dates before business-day adjustment (same length as `dates`).
    #[inline]
    pub fn unadjusted_dates(&self) -> &[Date] {
        &self.unadjusted
    }

    /// Periods between consecutive dates.
    #[inline]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Payment dates (period ends).
    pub fn payment_dates(&self) -> Vec<Date> {
        self.periods.iter().map(|p| p.payment()).collect()
    }

    /// First date.
    #[inline]
    pub fn start_date(&self) -> Date {
        self.dates[0]
    }

    /// Last date.
    #[inline]
    pub fn end_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Number of periods.
    #[inline]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false: a built schedule has at least one period.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Period containing `date` (`start <= date < end`).
    pub fn period_containing(&self, date: Date) -> Option<&Period> {
        self.periods.iter().find(|p| p.contains(date))
    }

    /// Last schedule date on or before `date`.
    pub fn previous_date(&self, date: Date) -> Option<Date> {
        self.dates.iter().rev().find(|d| **d <= date).copied()
    }

    /// First schedule date strictly after `date`.
    pub fn next_date(&self, date: Date) -> Option<Date> {
        self.dates.iter().find(|d| **d > date).copied()
    }

    /// Iterator over periods.
    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

/// Builder for [`Schedule`].
///
/// `start`, `end` and `frequency` are required. The calendar defaults to
/// weekends only, the adjustment rule to Modified Following, generation to
/// backward from the end date and the day count to ACT/365F.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    start: Option<Date>,
    end: Option<Date>,
    frequency: Option<Frequency>,
    calendar: Calendar,
    convention: BusinessDayConvention,
    generation: DateGeneration,
    day_count: DayCountConvention,
    end_of_month: bool,
}

impl ScheduleBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start date (inclusive).
    pub fn start(mut self, date: Date) -> Self {
        self.start = Some(date);
        self
    }

    /// End date (inclusive).
    pub fn end(mut self, date: Date) -> Self {
        self.end = Some(date);
        self
    }

    /// Payment frequency.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Holiday calendar for adjustment.
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Business-day adjustment rule.
    pub fn business_day_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Generation direction.
    pub fn generation(mut self, generation: DateGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Accrual day count of the resulting periods.
    pub fn day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Pin rolled dates to month end when the anchor date is a month end.
    pub fn end_of_month(mut self, flag: bool) -> Self {
        self.end_of_month = flag;
        self
    }

    /// Builds the schedule.
    ///
    /// # Errors
    ///
    /// - `MissingField` if start, end or frequency is unset
    /// - `InvalidDateRange` if `start >= end`
    /// - `NoPeriods` if adjustment collapses every date onto one
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        let start = self.start.ok_or(ScheduleError::MissingField { field: "start" })?;
        let end = self.end.ok_or(ScheduleError::MissingField { field: "end" })?;
        let frequency = self
            .frequency
            .ok_or(ScheduleError::MissingField { field: "frequency" })?;

        if start >= end {
            return Err(ScheduleError::InvalidDateRange { start, end });
        }

        let unadjusted = self.generate_unadjusted(start, end, frequency)?;

        let mut dates: Vec<Date> = Vec::with_capacity(unadjusted.len());
        let mut kept: Vec<Date> = Vec::with_capacity(unadjusted.len());
        for &d in &unadjusted {
            let adj = self.calendar.adjust(d, self.convention);
            if dates.last().is_some_and(|last| adj <= *last) {
                continue;
            }
            dates.push(adj);
            kept.push(d);
        }

        if dates.len() < 2 {
            return Err(ScheduleError::NoPeriods { start, end });
        }
        Schedule::from_dates(dates, kept, self.day_count)
    }

    fn generate_unadjusted(
        &self,
        start: Date,
        end: Date,
        frequency: Frequency,
    ) -> Result<Vec<Date>, ScheduleError> {
        if frequency == Frequency::Once {
            return Ok(vec![start, end]);
        }

        let mut inner = Vec::new();
        match self.generation {
            DateGeneration::Forward => {
                let mut k = 1;
                loop {
                    let d = self.step(start, frequency, k)?;
                    if d >= end {
                        break;
                    }
                    inner.push(d);
                    k += 1;
                }
            }
            DateGeneration::Backward => {
                let mut k = 1;
                loop {
                    let d = self.step(end, frequency, -k)?;
                    if d <= start {
                        break;
                    }
                    inner.push(d);
                    k += 1;
                }
                inner.reverse();
            }
        }

        let mut out = Vec::with_capacity(inner.len() + 2);
        out.push(start);
        out.extend(inner);
        out.push(end);
        Ok(out)
    }

    fn step(&self, anchor: Date, frequency: Frequency, k: i32) -> Result<Date, ScheduleError> {
        if let Some(months) = frequency.tenor_months() {
            let d = anchor.add_months(k * months as i32)?;
            if self.end_of_month && anchor.is_end_of_month() {
                return Ok(month_end(d)?);
            }
            return Ok(d);
        }
        let days = frequency.tenor_days().unwrap_or(1);
        Ok(anchor.add_days(days * k as i64)?)
    }
}

fn month_end(date: Date) -> Result<Date, ScheduleError> {
    let first = Date::from_ymd(date.year(), date.month(), 1)?;
    Ok(first.add_months(1)?.add_days(-1)?)
}

/// Generates adjusted dates from `start` to `end` (both included).
///
/// # Examples
///
/// ```
/// use pricer_core::types::calendar::Calendar;
/// use pricer_core::types::time::{BusinessDayConvention, Date};
/// use pricer_models::schedules::{schedule, DateGeneration, Frequency};
///
/// let dates = schedule(
///     Date::from_ymd(2024, 1, 15).unwrap(),
///     Date::from_ymd(2025, 1, 15).unwrap(),
///     Frequency::Quarterly,
///     &Calendar::WeekendsOnly,
///     BusinessDayConvention::Unadjusted,
///     DateGeneration::Backward,
/// )
/// .unwrap();
/// assert_eq!(dates.len(), 5);
/// ```
pub fn schedule(
    start: Date,
    end: Date,
    frequency: Frequency,
    calendar: &Calendar,
    convention: BusinessDayConvention,
    generation: DateGeneration,
) -> Result<Vec<Date>, ScheduleError> {
    let built = ScheduleBuilder::new()
        .start(start)
        .end(end)
        .frequency(frequency)
        .calendar(calendar.clone())
        .business_day_convention(convention)
        .generation(generation)
        .build()?;
    Ok(built.dates)
}
