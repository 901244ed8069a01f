//! Rayon-based dispatch of independent pricing tasks.
//!
//! [`parallel_calc`] ships `(instrument, measure)` pairs to the rayon pool
//! and gathers the results through a channel against a deadline. A task
//! still running at the deadline is reported as `None`; its worker is left
//! to finish and the late result is dropped.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;
use pricer_pricing::context::PricingContext;
use pricer_pricing::market::MarketDataProvider;
use pricer_pricing::mc::MonteCarloConfig;
use pricer_pricing::measure::RiskMeasure;
use pricer_pricing::pricers::Pricer;
use tracing::{debug, warn};

/// Default number of positions from which a portfolio prices in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16;

/// Default deadline of a parallel dispatch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for parallel execution.
#[derive(Clone, Debug)]
pub struct ParallelConfig {
    /// Minimum items before using parallelism.
    pub parallel_threshold: usize,
    /// Deadline for gathering dispatched tasks.
    pub timeout: Duration,
    /// Simulation settings handed to every task's pricer.
    pub mc: MonteCarloConfig,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            timeout: DEFAULT_TIMEOUT,
            mc: MonteCarloConfig::default(),
        }
    }
}

impl ParallelConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parallel threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the dispatch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the Monte Carlo configuration.
    pub fn with_mc_config(mut self, mc: MonteCarloConfig) -> Self {
        self.mc = mc;
        self
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelise(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }
}

/// One unit of work: a measure of an instrument.
#[derive(Clone, Debug)]
pub struct CalcTask {
    /// Instrument to price.
    pub instrument: Arc<Instrument>,
    /// Measure to compute.
    pub measure: RiskMeasure,
}

impl CalcTask {
    /// Creates a task.
    pub fn new(instrument: impl Into<Arc<Instrument>>, measure: RiskMeasure) -> Self {
        Self {
            instrument: instrument.into(),
            measure,
        }
    }
}

/// Outcome of a dispatched task; `None` when it missed the deadline.
pub type TaskResult = Option<Result<f64, PricingError>>;

/// Prices every task on the rayon pool and gathers until `timeout`.
///
/// Results are in task order. Each task prices under its own snapshot of
/// `context`, so the caller may re-enter the context once this returns.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{CurveRef, EuropeanOption, Instrument, MarketAttributes, OptionType};
/// use pricer_pricing::context::PricingContext;
/// use pricer_pricing::market::InMemoryMarketData;
/// use pricer_pricing::measure::RiskMeasure;
/// use pricer_risk::parallel::{parallel_calc, CalcTask};
///
/// let call = Instrument::European(
///     EuropeanOption::new("600000.SH", 100.0, Date::from_ymd(2022, 8, 13).unwrap(), OptionType::Call)
///         .with_curve(CurveRef::Flat(0.05))
///         .with_market(MarketAttributes::default().with_spot(100.0).with_volatility(0.2)),
/// );
/// let tasks = vec![
///     CalcTask::new(call.clone(), RiskMeasure::Price),
///     CalcTask::new(call, RiskMeasure::Delta),
/// ];
/// let ctx = PricingContext::at(Date::from_ymd(2021, 8, 13).unwrap());
/// let results = parallel_calc(Arc::new(InMemoryMarketData::new()), &ctx, &tasks, Duration::from_secs(30));
/// let price = results[0].clone().unwrap().unwrap();
/// assert!((price - 10.4506).abs() < 1e-3);
/// ```
pub fn parallel_calc<P>(
    market: Arc<P>,
    context: &PricingContext,
    tasks: &[CalcTask],
    timeout: Duration,
) -> Vec<TaskResult>
where
    P: MarketDataProvider + Send + Sync + 'static,
{
    let config = ParallelConfig::default().with_timeout(timeout);
    parallel_calc_with(market, context, tasks, &config)
}

/// [`parallel_calc`] with explicit simulation settings.
pub fn parallel_calc_with<P>(
    market: Arc<P>,
    context: &PricingContext,
    tasks: &[CalcTask],
    config: &ParallelConfig,
) -> Vec<TaskResult>
where
    P: MarketDataProvider + Send + Sync + 'static,
{
    let context = Arc::new(context.clone());
    let (tx, rx) = mpsc::channel();
    for (index, task) in tasks.iter().enumerate() {
        let tx = tx.clone();
        let market = Arc::clone(&market);
        let context = Arc::clone(&context);
        let task = task.clone();
        let mc = config.mc;
        rayon::spawn(move || {
            let pricer = Pricer::new(&*market, &*context).with_mc_config(mc);
            let result = pricer.calc(&task.instrument, task.measure);
            // A closed receiver means the deadline has passed.
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let deadline = Instant::now() + config.timeout;
    let mut results: Vec<TaskResult> = vec![None; tasks.len()];
    let mut pending = tasks.len();
    while pending > 0 {
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok((index, result)) => {
                results[index] = Some(result);
                pending -= 1;
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for (index, task) in tasks.iter().enumerate().filter(|(i, _)| results[*i].is_none()) {
        warn!(
            task = index,
            instrument = task.instrument.name(),
            symbol = %task.instrument.symbol(),
            measure = %task.measure,
            timeout_ms = config.timeout.as_millis() as u64,
            "task timed out"
        );
    }
    debug!(tasks = tasks.len(), finished = tasks.len() - pending, "parallel dispatch gathered");
    results
}
