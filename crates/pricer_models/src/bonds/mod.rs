//! Bond cash-flow engines and price/yield analytics.
//!
//! - [`BondTerms`] and [`BondCashflows`]: coupon periods, accrued interest,
//!   ex-dividend handling and amortisation
//! - [`FixedIncome`]: shared curve pricing, yield solve and risk figures,
//!   implemented by [`FixedRateBond`] and [`AdvanceRedemptionBond`]
//! - [`FloatingRateBond`]: projected coupons and discount margin
//! - [`PutableBond`]: coupon-adjustment clause with a hold/put decision
//! - [`BondOption`]: Black-76 on the forward price
//!
//! Prices are per 100 of face.

pub mod cashflows;
pub mod error;
pub mod fixed;
pub mod floating;
pub mod option;
pub mod putable;
pub mod redemption;
pub mod terms;
pub mod yields;

pub use cashflows::{BondCashflows, Cashflow, CouponPeriod};
pub use error::BondError;
pub use fixed::{BondAnalytics, FixedIncome, FixedRateBond, YIELD_BUMP};
pub use floating::{FloatingCashflow, FloatingRateBond};
pub use option::BondOption;
pub use putable::{PutConvention, PutDecision, PutDirection, PutableBond};
pub use redemption::{equal_instalments, AdvanceRedemptionBond};
pub use terms::BondTerms;
pub use yields::YieldConvention;
