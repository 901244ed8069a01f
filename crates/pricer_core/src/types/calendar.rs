//! Business-day calendars.
//!
//! A [`Calendar`] is an immutable holiday predicate for one jurisdiction.
//! Calendars are cheap to clone and safe to share across threads.
//!
//! - `WeekendsOnly`: Saturday and Sunday are the only holidays
//! - `China`: CFETS interbank calendar (statutory holidays plus the
//!   weekend make-up working days announced by the State Council)
//! - `UnitedStates`: rule-based US federal holidays
//! - `Custom`: weekends plus an explicit holiday set
//! - `Joint`: a day is a business day only if it is one in every member
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::{BusinessDayConvention, Calendar, Date};
//!
//! let cal = Calendar::China;
//! // National Day golden week 2021
//! let d = Date::from_ymd(2021, 10, 1).unwrap();
//! assert!(cal.is_holiday(d));
//! assert_eq!(
//!     cal.adjust(d, BusinessDayConvention::Following),
//!     Date::from_ymd(2021, 10, 8).unwrap()
//! );
//! // Saturday make-up working day
//! assert!(cal.is_business_day(Date::from_ymd(2021, 10, 9).unwrap()));
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::DateError;
use super::time::{BusinessDayConvention, Date};

/// Upper bound on consecutive non-business days searched when rolling.
const MAX_ROLL_DAYS: usize = 400;

/// Business-day calendar of a jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Calendar {
    /// Saturday/Sunday weekends only.
    #[default]
    WeekendsOnly,
    /// China interbank (CFETS) calendar.
    China,
    /// US federal (settlement) calendar.
    UnitedStates,
    /// Weekends plus a custom holiday list.
    Custom(BTreeSet<Date>),
    /// Union of the holidays of every member calendar.
    Joint(Vec<Calendar>),
}

impl Calendar {
    /// Builds a custom calendar from an iterator of holidays.
    pub fn custom<I: IntoIterator<Item = Date>>(holidays: I) -> Self {
        Calendar::Custom(holidays.into_iter().collect())
    }

    /// Jurisdiction tag.
    pub fn name(&self) -> &'static str {
        match self {
            Calendar::WeekendsOnly => "WeekendsOnly",
            Calendar::China => "China",
            Calendar::UnitedStates => "UnitedStates",
            Calendar::Custom(_) => "Custom",
            Calendar::Joint(_) => "Joint",
        }
    }

    /// Returns true if `date` is a business day.
    pub fn is_business_day(&self, date: Date) -> bool {
        match self {
            Calendar::WeekendsOnly => !date.is_weekend(),
            Calendar::China => china::is_business_day(date.into_inner()),
            Calendar::UnitedStates => {
                !date.is_weekend() && !united_states::is_holiday(date.into_inner())
            }
            Calendar::Custom(holidays) => !date.is_weekend() && !holidays.contains(&date),
            Calendar::Joint(members) => members.iter().all(|c| c.is_business_day(date)),
        }
    }

    /// Returns true if `date` is not a business day.
    pub fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Rolls `date` onto a business day under `convention`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::{BusinessDayConvention, Calendar, Date};
    ///
    /// let cal = Calendar::WeekendsOnly;
    /// let sat = Date::from_ymd(2024, 8, 31).unwrap();
    /// assert_eq!(
    ///     cal.adjust(sat, BusinessDayConvention::ModifiedFollowing),
    ///     Date::from_ymd(2024, 8, 30).unwrap()
    /// );
    /// ```
    pub fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => self.roll(date, 1),
            BusinessDayConvention::Preceding => self.roll(date, -1),
            BusinessDayConvention::ModifiedFollowing => {
                let rolled = self.roll(date, 1);
                if rolled.month() != date.month() {
                    self.roll(date, -1)
                } else {
                    rolled
                }
            }
            BusinessDayConvention::ModifiedPreceding => {
                let rolled = self.roll(date, -1);
                if rolled.month() != date.month() {
                    self.roll(date, 1)
                } else {
                    rolled
                }
            }
        }
    }

    fn roll(&self, date: Date, step: i64) -> Date {
        let mut current = date;
        for _ in 0..MAX_ROLL_DAYS {
            if self.is_business_day(current) {
                return current;
            }
            match current.add_days(step) {
                Ok(next) => current = next,
                Err(_) => return current,
            }
        }
        current
    }

    /// Moves `n` business days forward (or backward for negative `n`).
    ///
    /// The start date itself need not be a business day; `n == 0` returns
    /// the date rolled forward.
    pub fn add_business_days(&self, date: Date, n: i64) -> Result<Date, DateError> {
        if n == 0 {
            return Ok(self.roll(date, 1));
        }
        let step = n.signum();
        let mut remaining = n.abs();
        let mut current = date;
        while remaining > 0 {
            current = current.add_days(step)?;
            if self.is_business_day(current) {
                remaining -= 1;
            }
        }
        Ok(current)
    }

    /// Number of business days in `(start, end]`.
    pub fn business_days_between(&self, start: Date, end: Date) -> i64 {
        if end <= start {
            return 0;
        }
        let mut count = 0;
        let mut current = start;
        while current < end {
            match current.add_days(1) {
                Ok(next) => current = next,
                Err(_) => break,
            }
            if self.is_business_day(current) {
                count += 1;
            }
        }
        count
    }

    /// Business days in `[start, end]`, in order.
    pub fn business_days(&self, start: Date, end: Date) -> Vec<Date> {
        let mut out = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_business_day(current) {
                out.push(current);
            }
            match current.add_days(1) {
                Ok(next) => current = next,
                Err(_) => break,
            }
        }
        out
    }
}

/// Rolls `date` onto a business day of `calendar` under `rule`.
///
/// Free-function form of [`Calendar::adjust`].
pub fn next_business_day(date: Date, calendar: &Calendar, rule: BusinessDayConvention) -> Date {
    calendar.adjust(date, rule)
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Calendar {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "WEEKENDSONLY" | "WEEKENDS" | "NULL" => Ok(Calendar::WeekendsOnly),
            "CHINA" | "CN" | "CFETS" | "CNY" => Ok(Calendar::China),
            "UNITEDSTATES" | "US" | "USD" | "NYC" => Ok(Calendar::UnitedStates),
            _ => Err(DateError::ParseError(format!("Unknown calendar: {}", s))),
        }
    }
}

mod china {
    use super::*;

    /// Statutory holiday blocks as (year, month, first day, length in days).
    const HOLIDAYS: &[(i32, u32, u32, u32)] = &[
        (2019, 1, 1, 1),
        (2019, 2, 4, 7),
        (2019, 4, 5, 1),
        (2019, 5, 1, 4),
        (2019, 6, 7, 1),
        (2019, 9, 13, 1),
        (2019, 10, 1, 7),
        (2020, 1, 1, 1),
        (2020, 1, 24, 10),
        (2020, 4, 4, 3),
        (2020, 5, 1, 5),
        (2020, 6, 25, 3),
        (2020, 10, 1, 8),
        (2021, 1, 1, 1),
        (2021, 2, 11, 7),
        (2021, 4, 3, 3),
        (2021, 5, 1, 5),
        (2021, 6, 12, 3),
        (2021, 9, 19, 3),
        (2021, 10, 1, 7),
        (2022, 1, 1, 3),
        (2022, 1, 31, 7),
        (2022, 4, 3, 3),
        (2022, 4, 30, 5),
        (2022, 6, 3, 3),
        (2022, 9, 10, 3),
        (2022, 10, 1, 7),
        (2022, 12, 31, 1),
        (2023, 1, 1, 2),
        (2023, 1, 21, 7),
        (2023, 4, 5, 1),
        (2023, 4, 29, 5),
        (2023, 6, 22, 3),
        (2023, 9, 29, 8),
        (2024, 1, 1, 1),
        (2024, 2, 10, 8),
        (2024, 4, 4, 3),
        (2024, 5, 1, 5),
        (2024, 6, 10, 1),
        (2024, 9, 15, 3),
        (2024, 10, 1, 7),
        (2025, 1, 1, 1),
        (2025, 1, 28, 8),
        (2025, 4, 4, 3),
        (2025, 5, 1, 5),
        (2025, 5, 31, 3),
        (2025, 10, 1, 8),
    ];

    /// Weekend days declared working days (调休).
    const WORKING_WEEKENDS: &[(i32, u32, u32)] = &[
        (2019, 2, 2),
        (2019, 2, 3),
        (2019, 4, 28),
        (2019, 5, 5),
        (2019, 9, 29),
        (2019, 10, 12),
        (2020, 1, 19),
        (2020, 4, 26),
        (2020, 5, 9),
        (2020, 6, 28),
        (2020, 9, 27),
        (2020, 10, 10),
        (2021, 2, 7),
        (2021, 2, 20),
        (2021, 4, 25),
        (2021, 5, 8),
        (2021, 9, 18),
        (2021, 9, 26),
        (2021, 10, 9),
        (2022, 1, 29),
        (2022, 1, 30),
        (2022, 4, 2),
        (2022, 4, 24),
        (2022, 5, 7),
        (2022, 10, 8),
        (2022, 10, 9),
        (2023, 1, 28),
        (2023, 1, 29),
        (2023, 4, 23),
        (2023, 5, 6),
        (2023, 6, 25),
        (2023, 10, 7),
        (2023, 10, 8),
        (2024, 2, 4),
        (2024, 2, 18),
        (2024, 4, 7),
        (2024, 4, 28),
        (2024, 5, 11),
        (2024, 9, 14),
        (2024, 9, 29),
        (2024, 10, 12),
        (2025, 1, 26),
        (2025, 2, 8),
        (2025, 4, 27),
        (2025, 9, 28),
        (2025, 10, 11),
    ];

    fn is_statutory_holiday(date: NaiveDate) -> bool {
        HOLIDAYS.iter().any(|&(y, m, d, len)| {
            NaiveDate::from_ymd_opt(y, m, d).is_some_and(|first| {
                let offset = (date - first).num_days();
                (0..len as i64).contains(&offset)
            })
        })
    }

    fn is_working_weekend(date: NaiveDate) -> bool {
        WORKING_WEEKENDS
            .iter()
            .any(|&(y, m, d)| date.year() == y && date.month() == m && date.day() == d)
    }

    pub(super) fn is_business_day(date: NaiveDate) -> bool {
        if is_statutory_holiday(date) {
            return false;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => is_working_weekend(date),
            _ => true,
        }
    }
}

mod united_states {
    use super::*;

    fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let offset = (7 + weekday.num_days_from_monday() as i32
            - first.weekday().num_days_from_monday() as i32)
            % 7;
        NaiveDate::from_ymd_opt(year, month, 1 + offset as u32 + 7 * (n - 1))
    }

    fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
        let first_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let last = first_next.pred_opt()?;
        let back = (7 + last.weekday().num_days_from_monday() as i64
            - weekday.num_days_from_monday() as i64)
            % 7;
        last.checked_sub_days(chrono::Days::new(back as u64))
    }

    /// Fixed-date holiday, observed on Friday/Monday when it falls on a weekend.
    fn observed(date: NaiveDate, month: u32, day: u32) -> bool {
        let Some(actual) = NaiveDate::from_ymd_opt(date.year(), month, day) else {
            return false;
        };
        let observed = match actual.weekday() {
            Weekday::Sat => actual.pred_opt(),
            Weekday::Sun => actual.succ_opt(),
            _ => Some(actual),
        };
        observed == Some(date)
    }

    pub(super) fn is_holiday(date: NaiveDate) -> bool {
        let y = date.year();
        let is = |d: Option<NaiveDate>| d == Some(date);
        observed(date, 1, 1)
            || is(nth_weekday(y, 1, Weekday::Mon, 3))
            || is(nth_weekday(y, 2, Weekday::Mon, 3))
            || is(last_weekday(y, 5, Weekday::Mon))
            || (y >= 2022 && observed(date, 6, 19))
            || observed(date, 7, 4)
            || is(nth_weekday(y, 9, Weekday::Mon, 1))
            || is(nth_weekday(y, 10, Weekday::Mon, 2))
            || observed(date, 11, 11)
            || is(nth_weekday(y, 11, Weekday::Thu, 4))
            || observed(date, 12, 25)
    }
}
