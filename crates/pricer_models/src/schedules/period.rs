//! A single accrual period.

use pricer_core::types::time::{Date, DayCountConvention};
use std::fmt;

/// Accrual period with its payment date and day count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    start: Date,
    end: Date,
    payment: Date,
    day_count: DayCountConvention,
}

impl Period {
    /// Create a period.
    #[inline]
    pub fn new(start: Date, end: Date, payment: Date, day_count: DayCountConvention) -> Self {
        Self {
            start,
            end,
            payment,
            day_count,
        }
    }

    /// Accrual start.
    #[inline]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Accrual end.
    #[inline]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Payment date.
    #[inline]
    pub fn payment(&self) -> Date {
        self.payment
    }

    /// Accrual day count.
    #[inline]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Accrual year fraction.
    #[inline]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_dates(self.start, self.end)
    }

    /// Calendar days in the period.
    #[inline]
    pub fn days(&self) -> i64 {
        self.end - self.start
    }

    /// `start <= date < end`.
    #[inline]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date < self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Period({} to {}, pay {}, {})",
            self.start, self.end, self.payment, self.day_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let p = Period::new(
            Date::from_ymd(2024, 1, 1).unwrap(),
            Date::from_ymd(2024, 7, 1).unwrap(),
            Date::from_ymd(2024, 7, 1).unwrap(),
            DayCountConvention::Actual365Fixed,
        );
        assert!(p.contains(Date::from_ymd(2024, 1, 1).unwrap()));
        assert!(!p.contains(Date::from_ymd(2024, 7, 1).unwrap()));
        assert_eq!(p.days(), 182);
        assert!((p.year_fraction() - 182.0 / 365.0).abs() < 1e-15);
    }
}
