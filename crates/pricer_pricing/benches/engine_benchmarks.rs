//! Criterion benchmarks for the pricing engine.
//!
//! Benchmarks cover:
//! - Closed-form, lattice and Monte Carlo equity pricing through the `Pricer`
//! - Snowball simulation at increasing path counts
//! - The full bump-and-revalue greek set
//! - Bond yield measures off a bootstrapped curve

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::Date;
use pricer_models::bonds::BondTerms;
use pricer_models::instruments::{
    AmericanOption, AsianOption, CurveRef, EuropeanOption, FixedBond, Instrument, MarketAttributes, OptionType,
    Snowball, SnowballSchedule,
};
use pricer_models::schedules::Frequency;
use pricer_pricing::context::{ContextLayer, PricingContext};
use pricer_pricing::market::InMemoryMarketData;
use pricer_pricing::measure::RiskMeasure;
use pricer_pricing::mc::MonteCarloConfig;
use pricer_pricing::pricers::Pricer;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn today() -> Date {
    d(2021, 8, 13)
}

fn market() -> InMemoryMarketData {
    InMemoryMarketData::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/market_data.json")).unwrap()
}

fn european() -> EuropeanOption {
    EuropeanOption::new("600000.SH", 5.3, d(2022, 8, 12), OptionType::Put)
        .with_curve(CurveRef::Flat(0.02))
        .with_market(MarketAttributes::default().with_volatility(0.2))
}

fn snowball() -> Instrument {
    let schedule = SnowballSchedule::monthly(d(2021, 6, 3), d(2022, 6, 3), 0.2).unwrap();
    let mut s = Snowball::new("600000.SH", 5.262, 5.5, 5.2, schedule).with_notional(1_000_000.0);
    s.discount_curve = CurveRef::Flat(0.02);
    s.market = MarketAttributes::default().with_volatility(0.2);
    Instrument::Snowball(s)
}

/// Benchmark equity pricing by method.
fn bench_equity_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("equity_price");
    let market = market();
    let ctx = PricingContext::at(today());
    let pricer = Pricer::new(&market, &ctx);

    let cases = [
        ("black_scholes", Instrument::European(european())),
        (
            "crr_500",
            Instrument::American(AmericanOption::new(european()).with_steps_per_year(500)),
        ),
        (
            "asian_mc",
            Instrument::Asian(AsianOption::new(european(), today(), 12)),
        ),
    ];
    for (name, instrument) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| pricer.calc(black_box(instrument), RiskMeasure::Price).unwrap());
        });
    }
    group.finish();
}

/// Benchmark snowball simulation scaling in path count.
fn bench_snowball_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("snowball_mc");
    group.sample_size(10);
    let market = market();
    let ctx = PricingContext::at(today());
    let instrument = snowball();

    for n_paths in [1_000usize, 10_000, 50_000] {
        let config = MonteCarloConfig::builder().n_paths(n_paths).seed(42).build().unwrap();
        let pricer = Pricer::new(&market, &ctx).with_mc_config(config);
        group.bench_with_input(BenchmarkId::new("paths", n_paths), &instrument, |b, instrument| {
            b.iter(|| pricer.calc(black_box(instrument), RiskMeasure::Price).unwrap());
        });
    }
    group.finish();
}

/// Benchmark the full greek set against a single price.
fn bench_greeks(c: &mut Criterion) {
    let mut group = c.benchmark_group("greeks");
    let market = market();
    let ctx = PricingContext::at(today());
    let pricer = Pricer::new(&market, &ctx);
    let instrument = Instrument::European(european());

    group.bench_function("price_only", |b| {
        b.iter(|| pricer.calc(black_box(&instrument), RiskMeasure::Price).unwrap());
    });
    group.bench_function("all_greeks", |b| {
        b.iter(|| pricer.greeks(black_box(&instrument)).unwrap());
    });
    group.finish();
}

/// Benchmark bond yield measures on a thirty-year bond.
fn bench_bond_measures(c: &mut Criterion) {
    let mut group = c.benchmark_group("bond_measures");
    let market = market();
    let mut ctx = PricingContext::at(d(2021, 12, 27));
    ctx.enter(ContextLayer::new().clean_price("200007.IB", 99.1455));
    let pricer = Pricer::new(&market, &ctx);
    let terms = BondTerms::new(d(2020, 3, 16), d(2050, 3, 16), 0.0339, Frequency::SemiAnnual);
    let bond = Instrument::FixedBond(FixedBond::new(
        "200007.IB",
        terms,
        CurveRef::BondYield("CBD100311".into()),
    ));

    for measure in [RiskMeasure::Price, RiskMeasure::Ytm, RiskMeasure::ModifiedDuration] {
        group.bench_with_input(BenchmarkId::new("measure", measure), &bond, |b, bond| {
            b.iter(|| pricer.calc(black_box(bond), measure).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_equity_methods,
    bench_snowball_paths,
    bench_greeks,
    bench_bond_measures
);
criterion_main!(benches);
