//! Criterion benchmarks for portfolio aggregation.
//!
//! Benchmarks cover:
//! - Portfolio `calc` with varying position counts, serial and rayon
//! - Portfolio greeks
//! - Deadline-gathered parallel dispatch

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::Date;
use pricer_models::bonds::BondTerms;
use pricer_models::instruments::{CurveRef, EuropeanOption, FixedBond, Instrument, MarketAttributes, OptionType};
use pricer_models::schedules::Frequency;
use pricer_pricing::context::PricingContext;
use pricer_pricing::market::InMemoryMarketData;
use pricer_pricing::measure::RiskMeasure;
use pricer_risk::parallel::{parallel_calc, CalcTask, ParallelConfig};
use pricer_risk::portfolio::{Portfolio, Position};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

/// Alternating options and bonds with varied terms.
fn generate_instruments(n: usize) -> Vec<Instrument> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                let kind = if i % 4 == 0 { OptionType::Call } else { OptionType::Put };
                Instrument::European(
                    EuropeanOption::new("600000.SH", 80.0 + (i % 40) as f64, d(2022, 8, 13), kind)
                        .with_curve(CurveRef::Flat(0.03))
                        .with_market(MarketAttributes::default().with_spot(100.0).with_volatility(0.2)),
                )
            } else {
                let terms = BondTerms::new(
                    d(2020, 3, 16),
                    d(2025 + (i % 20) as i32, 3, 16),
                    0.02 + 0.001 * (i % 15) as f64,
                    Frequency::Annual,
                );
                Instrument::FixedBond(FixedBond::new(format!("BOND{i}"), terms, CurveRef::Flat(0.025)))
            }
        })
        .collect()
}

fn generate_portfolio(n: usize, threshold: usize) -> Portfolio {
    let mut book = Portfolio::new("bench").with_parallel_config(ParallelConfig::new().with_parallel_threshold(threshold));
    for (i, instrument) in generate_instruments(n).into_iter().enumerate() {
        book.add(Position::new(format!("P{i}"), instrument, (i % 7) as f64 - 3.0)).unwrap();
    }
    book
}

/// Benchmark portfolio calc, serial against rayon.
fn bench_portfolio_calc(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_calc");
    let market = InMemoryMarketData::new();
    let ctx = PricingContext::at(d(2021, 8, 13));

    for n in [10usize, 100, 1000] {
        let serial = generate_portfolio(n, usize::MAX);
        let parallel = generate_portfolio(n, 0);
        group.bench_with_input(BenchmarkId::new("serial", n), &serial, |b, book| {
            b.iter(|| book.calc(black_box(&market), &ctx, RiskMeasure::Price));
        });
        group.bench_with_input(BenchmarkId::new("rayon", n), &parallel, |b, book| {
            b.iter(|| book.calc(black_box(&market), &ctx, RiskMeasure::Price));
        });
    }
    group.finish();
}

/// Benchmark portfolio greeks.
fn bench_portfolio_greeks(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_greeks");
    let market = InMemoryMarketData::new();
    let ctx = PricingContext::at(d(2021, 8, 13));

    for n in [10usize, 100] {
        let book = generate_portfolio(n, 0);
        group.bench_with_input(BenchmarkId::new("all_greeks", n), &book, |b, book| {
            b.iter(|| book.greeks(black_box(&market), &ctx));
        });
    }
    group.finish();
}

/// Benchmark dispatch through the deadline-gathered pool.
fn bench_parallel_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_calc");
    let market = Arc::new(InMemoryMarketData::new());
    let ctx = PricingContext::at(d(2021, 8, 13));

    for n in [10usize, 100, 1000] {
        let tasks: Vec<CalcTask> = generate_instruments(n)
            .into_iter()
            .map(|i| CalcTask::new(i, RiskMeasure::Price))
            .collect();
        group.bench_with_input(BenchmarkId::new("tasks", n), &tasks, |b, tasks| {
            b.iter(|| parallel_calc(Arc::clone(&market), &ctx, black_box(tasks), Duration::from_secs(60)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_portfolio_calc,
    bench_portfolio_greeks,
    bench_parallel_dispatch
);
criterion_main!(benches);
