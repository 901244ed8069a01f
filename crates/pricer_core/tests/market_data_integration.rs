//! Integration tests across curves, adjustments and surfaces.

use approx::assert_relative_eq;
use pricer_core::market_data::{
    Compounding, CurveAdjustment, CurveEnum, CurveInterpolation, CurveRotation, FxForwardCurve,
    FxForwardInterpolation, FxImpliedCurve, YieldCurve, ZeroCurve,
};
use pricer_core::types::{Calendar, Date, DayCountConvention, PricingError};
use std::sync::Arc;

fn anchor() -> Date {
    Date::from_ymd(2021, 12, 27).unwrap()
}

#[test]
fn test_adjusted_curve_through_enum() {
    let base = ZeroCurve::new(
        anchor(),
        &[0.5, 1.0, 5.0, 10.0],
        &[0.021, 0.022, 0.027, 0.030],
        Compounding::Periodic(1),
        CurveInterpolation::FlatForward,
    )
    .unwrap();
    let adj = CurveAdjustment::parallel(25.0).with_rotation(CurveRotation {
        pivot: 5.0,
        start: 1.0,
        end: 10.0,
        shift_bp: 18.0,
    });
    let shifted: CurveEnum = adj.apply(&base).unwrap().into();

    let at_pivot = shifted.zero_rate(5.0, Compounding::Periodic(1)).unwrap();
    assert_relative_eq!(at_pivot, 0.027 + 0.0025, epsilon = 1e-12);
    assert!(shifted.df(Date::from_ymd(2030, 1, 1).unwrap()).unwrap() < base.df(Date::from_ymd(2030, 1, 1).unwrap()).unwrap());
}

#[test]
fn test_implied_foreign_rate_below_domestic_when_points_positive() {
    let dom = Arc::new(ZeroCurve::flat(anchor(), 0.025, Compounding::Continuous).unwrap());
    let fwd = Arc::new(
        FxForwardCurve::new(anchor(), 6.5, &[1.0], &[0.12], FxForwardInterpolation::LogLinear).unwrap(),
    );
    let foreign = FxImpliedCurve::new(dom, fwd).unwrap();
    let r_f = foreign.zero_rate(1.0, Compounding::Continuous).unwrap();
    assert!(r_f < 0.025);
    assert_relative_eq!(r_f, 0.025 - (6.62f64 / 6.5).ln(), epsilon = 1e-12);
}

#[test]
fn test_market_data_errors_convert() {
    let err: PricingError = ZeroCurve::flat(anchor(), 0.02, Compounding::Continuous)
        .unwrap()
        .discount_factor(-1.0)
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), "InvalidMarketData");
}

#[test]
fn test_calendar_and_curve_dates() {
    let settle = Calendar::China.add_business_days(anchor(), 1).unwrap();
    let curve = ZeroCurve::flat(anchor(), 0.03, Compounding::Continuous)
        .unwrap()
        .with_day_count(DayCountConvention::Actual365Fixed);
    let t = curve.time_of(settle);
    assert_relative_eq!(t, (settle - anchor()) as f64 / 365.0, epsilon = 1e-15);
}
