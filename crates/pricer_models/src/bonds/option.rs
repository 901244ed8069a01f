//! European options on fixed-rate bonds, priced with Black-76 on the
//! forward bond price.

use pricer_core::market_data::YieldCurve;
use pricer_core::types::Date;

use super::error::BondError;
use super::fixed::{FixedIncome, FixedRateBond};
use crate::analytical::black76_price;
use crate::instruments::OptionType;

/// European call or put on a bond, struck on the clean price.
#[derive(Debug, Clone, PartialEq)]
pub struct BondOption {
    bond: FixedRateBond,
    expiry: Date,
    strike: f64,
    option_type: OptionType,
}

impl BondOption {
    /// Builds the option; the expiry must fall before the bond matures.
    pub fn new(bond: FixedRateBond, expiry: Date, strike: f64, option_type: OptionType) -> Result<Self, BondError> {
        if expiry >= bond.maturity() {
            return Err(BondError::InvalidTerms(format!(
                "option expiry {expiry} not before bond maturity {}",
                bond.maturity()
            )));
        }
        if !(strike > 0.0) {
            return Err(BondError::InvalidTerms(format!("strike {strike}")));
        }
        Ok(Self {
            bond,
            expiry,
            strike,
            option_type,
        })
    }

    /// Underlying bond.
    pub fn bond(&self) -> &FixedRateBond {
        &self.bond
    }

    /// Expiry date.
    pub fn expiry(&self) -> Date {
        self.expiry
    }

    /// Clean strike.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Forward full price for delivery at expiry.
    ///
    /// Spot full price less the value of coupons paid before expiry, carried
    /// to expiry.
    pub fn forward_full_price<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        let df_settle = curve.df(settlement)?;
        let spot_full = self.bond.full_price_from_curve(curve, settlement)?;
        let mut intervening: f64 = 0.0;
        for cf in self.bond.cashflows(settlement)?.iter().filter(|cf| cf.date < self.expiry) {
            intervening += cf.amount() * curve.df(cf.date)? / df_settle;
        }
        let df_expiry = curve.df(self.expiry)? / df_settle;
        Ok((spot_full - intervening) / df_expiry)
    }

    /// Forward clean price at expiry.
    pub fn forward_clean_price<C: YieldCurve>(&self, curve: &C, settlement: Date) -> Result<f64, BondError> {
        Ok(self.forward_full_price(curve, settlement)? - self.bond.accrued_interest(self.expiry)?)
    }

    /// Black value per 100 face at settlement.
    ///
    /// The strike is moved to full-price terms by the accrual from the last
    /// coupon before expiry to expiry.
    ///
    /// # Errors
    ///
    /// `Expired` once settlement reaches the expiry; volatility validation
    /// errors from the Black formula.
    pub fn price<C: YieldCurve>(&self, curve: &C, settlement: Date, volatility: f64) -> Result<f64, BondError> {
        if settlement >= self.expiry {
            return Err(BondError::Expired {
                settlement: settlement.to_string(),
                limit: self.expiry.to_string(),
            });
        }
        let forward = self.forward_full_price(curve, settlement)?;
        let strike = self.strike + self.bond.accrued_interest(self.expiry)?;
        let tau = curve.time_of(self.expiry) - curve.time_of(settlement);
        let df = curve.df(self.expiry)? / curve.df(settlement)?;
        Ok(black76_price(forward, strike, tau, df, volatility, self.option_type)?)
    }
}
