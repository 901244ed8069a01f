//! Benchmarks for pricer_models.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::market_data::{Compounding, ZeroCurve};
use pricer_core::types::Date;
use pricer_models::analytical::{
    asian_price, bs_value, knockout_price, AsianInputs, AsianMethod, BarrierMonitoring, KnockoutInputs,
    PremiumQuote,
};
use pricer_models::bonds::{BondTerms, FixedIncome, FixedRateBond, YieldConvention};
use pricer_models::instruments::OptionType;
use pricer_models::schedules::Frequency;

fn benchmark_black_scholes(c: &mut Criterion) {
    c.bench_function("bs_value_call", |b| {
        b.iter(|| {
            bs_value(
                black_box(100.0),
                1.0,
                105.0,
                0.03,
                0.01,
                0.2,
                OptionType::Call,
                PremiumQuote::Price,
            )
        })
    });
}

fn benchmark_knockout(c: &mut Criterion) {
    let inputs = KnockoutInputs {
        spot: 5.262,
        strike: 5.3,
        barrier: 5.5,
        rebate: 0.2,
        rate: 0.02,
        dividend: 0.0,
        volatility: 0.1,
        expiry: 0.0575,
        monitoring: BarrierMonitoring::Daily,
    };
    c.bench_function("knockout_up_and_out", |b| {
        b.iter(|| knockout_price(black_box(&inputs), OptionType::Call))
    });
}

fn benchmark_asian(c: &mut Criterion) {
    let mut group = c.benchmark_group("asian");
    for method in [AsianMethod::Geometric, AsianMethod::TurnbullWakeman, AsianMethod::Curran] {
        let inputs = AsianInputs {
            spot: 100.0,
            strike: 100.0,
            rate: 0.03,
            dividend: 0.0,
            volatility: 0.25,
            averaging_start: 0.0,
            expiry: 1.0,
            observations: 252,
            accrued_average: None,
        };
        group.bench_with_input(BenchmarkId::from_parameter(method), &inputs, |b, inp| {
            b.iter(|| asian_price(black_box(inp), method, OptionType::Call))
        });
    }
    group.finish();
}

fn benchmark_bond_analytics(c: &mut Criterion) {
    let issue = Date::from_ymd(2020, 3, 16).unwrap();
    let maturity = Date::from_ymd(2050, 3, 16).unwrap();
    let settle = Date::from_ymd(2021, 12, 27).unwrap();
    let bond = FixedRateBond::new(BondTerms::new(issue, maturity, 0.0339, Frequency::SemiAnnual)).unwrap();
    let curve = ZeroCurve::flat(settle, 0.034, Compounding::Continuous).unwrap();

    c.bench_function("bond_ytm_30y", |b| {
        b.iter(|| bond.ytm(black_box(99.1455), settle, YieldConvention::Compounded))
    });
    c.bench_function("bond_analytics_30y", |b| {
        b.iter(|| bond.analytics(black_box(99.1455), settle, YieldConvention::Compounded))
    });
    c.bench_function("bond_curve_price_30y", |b| {
        b.iter(|| bond.clean_price_from_curve(black_box(&curve), settle))
    });
}

criterion_group!(
    benches,
    benchmark_black_scholes,
    benchmark_knockout,
    benchmark_asian,
    benchmark_bond_analytics
);
criterion_main!(benches);
