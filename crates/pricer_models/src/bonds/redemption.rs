//! Bonds repaying principal in scheduled instalments before maturity.

use pricer_core::types::Date;

use super::cashflows::BondCashflows;
use super::error::BondError;
use super::fixed::FixedIncome;
use super::terms::BondTerms;
use crate::schedules::Frequency;

/// Fixed-coupon bond with advance redemptions.
///
/// Each coupon accrues on the principal outstanding at the start of its
/// period. The final instalment is whatever principal remains at maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceRedemptionBond {
    terms: BondTerms,
    schedule: BondCashflows,
}

impl AdvanceRedemptionBond {
    /// Builds the bond from `terms` and an instalment schedule of
    /// `(date, fraction of original face)`.
    ///
    /// # Errors
    ///
    /// `InvalidTerms` for an empty schedule, fractions repaying more than the
    /// face, or dates that are not coupon dates.
    pub fn new(terms: BondTerms, redemptions: Vec<(Date, f64)>) -> Result<Self, BondError> {
        if redemptions.is_empty() {
            return Err(BondError::InvalidTerms("no redemption instalments".to_string()));
        }
        let terms = terms.with_amortisation(redemptions);
        let schedule = BondCashflows::generate(&terms)?;
        Ok(Self { terms, schedule })
    }

    /// Principal outstanding for a holder settling on `date`.
    pub fn outstanding(&self, date: Date) -> f64 {
        self.terms.outstanding_at(date)
    }

    /// Instalment schedule.
    pub fn redemptions(&self) -> &[(Date, f64)] {
        &self.terms.amortisation
    }
}

impl FixedIncome for AdvanceRedemptionBond {
    fn terms(&self) -> &BondTerms {
        &self.terms
    }

    fn schedule(&self) -> &BondCashflows {
        &self.schedule
    }
}

/// `count` equal instalments, the first on `first`, then every `frequency`.
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::bonds::equal_instalments;
/// use pricer_models::schedules::Frequency;
///
/// let plan = equal_instalments(Date::from_ymd(2024, 10, 29).unwrap(), 5, Frequency::Annual).unwrap();
/// assert_eq!(plan.len(), 5);
/// assert_eq!(plan[4].0, Date::from_ymd(2028, 10, 29).unwrap());
/// assert!((plan.iter().map(|p| p.1).sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn equal_instalments(first: Date, count: u32, frequency: Frequency) -> Result<Vec<(Date, f64)>, BondError> {
    if count == 0 {
        return Err(BondError::InvalidTerms("instalment count must be positive".to_string()));
    }
    let months = frequency.tenor_months().ok_or_else(|| {
        BondError::InvalidTerms(format!("instalments need a monthly frequency, got {frequency}"))
    })?;
    let share = 1.0 / f64::from(count);
    (0..count)
        .map(|k| Ok((first.add_months((k * months) as i32)?, share)))
        .collect()
}
