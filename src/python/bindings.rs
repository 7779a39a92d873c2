//! PyO3 function bindings for quantasim.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::{EngineConfig, ProviderConfig};
use crate::core::types::{Interval, SimulationParameters};
use crate::data::MarketDataService;
use crate::indicators;
use crate::metrics::stats::summarize;
use crate::simulation::engine::{ProjectionEngine, ProjectionReport, ProjectionRequest};
use crate::simulation::gbm::PathSimulator;
use crate::simulation::CancellationToken;

use super::numpy_bridge::*;

// ============================================================================
// Result Classes
// ============================================================================

/// Python-exposed projection report.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyProjection {
    report: ProjectionReport,
}

#[pymethods]
impl PyProjection {
    #[getter]
    fn ticker(&self) -> String {
        self.report.ticker.clone()
    }

    #[getter]
    fn is_synthetic(&self) -> bool {
        self.report.data_source == crate::core::types::DataSource::Synthetic
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.report.seed
    }

    #[getter]
    fn mu(&self) -> f64 {
        self.report.parameters.mu
    }

    #[getter]
    fn sigma(&self) -> f64 {
        self.report.parameters.sigma
    }

    #[getter]
    fn mean(&self) -> f64 {
        self.report.statistics.mean
    }

    #[getter]
    fn median(&self) -> f64 {
        self.report.statistics.median
    }

    #[getter]
    fn mean_roi(&self) -> f64 {
        self.report.statistics.mean_roi
    }

    #[getter]
    fn probability_of_profit(&self) -> f64 {
        self.report.statistics.probability_of_profit
    }

    #[getter]
    fn sharpe_ratio(&self) -> f64 {
        self.report.statistics.sharpe_ratio
    }

    #[getter]
    fn avg_max_drawdown(&self) -> f64 {
        self.report.statistics.avg_max_drawdown
    }

    /// (p5, p25, p50, p75, p95) of the final values.
    #[getter]
    fn percentiles(&self) -> (f64, f64, f64, f64, f64) {
        let p = self.report.statistics.percentiles;
        (p.p5, p.p25, p.p50, p.p75, p.p95)
    }

    fn __repr__(&self) -> String {
        format!(
            "Projection(ticker={}, mean={:.2}, median={:.2}, p_profit={:.1}%)",
            self.report.ticker,
            self.report.statistics.mean,
            self.report.statistics.median,
            self.report.statistics.probability_of_profit
        )
    }

    /// Full report as a JSON document.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.report).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

// ============================================================================
// Projection Functions
// ============================================================================

/// Fetch history for `ticker` and run a Monte Carlo projection.
#[pyfunction]
#[pyo3(signature = (ticker, initial_investment=10000.0, num_simulations=1000, years=5.0, interval="1d", seed=None, offline=false))]
pub fn run_projection(
    py: Python<'_>,
    ticker: &str,
    initial_investment: f64,
    num_simulations: usize,
    years: f64,
    interval: &str,
    seed: Option<u64>,
    offline: bool,
) -> PyResult<PyProjection> {
    let interval: Interval = interval.parse()?;
    let mut config = EngineConfig::default();
    config.provider.offline = offline;
    config.provider.synthetic_seed = seed;

    let request = ProjectionRequest {
        ticker: ticker.to_string(),
        initial_investment,
        num_simulations,
        years,
        interval,
        seed,
    };

    let report = py.allow_threads(move || {
        let engine = ProjectionEngine::new(config)?;
        engine.run(&request)
    })?;
    Ok(PyProjection { report })
}

/// Final-day values of a GBM ensemble with explicit daily drift and volatility.
#[pyfunction]
#[pyo3(signature = (initial_investment, num_simulations, years, mu, sigma, seed=0))]
pub fn simulate_final_values<'py>(
    py: Python<'py>,
    initial_investment: f64,
    num_simulations: usize,
    years: f64,
    mu: f64,
    sigma: f64,
    seed: u64,
) -> PyResult<&'py PyArray1<f64>> {
    let params = SimulationParameters::new(initial_investment, num_simulations, years, mu, sigma)?;
    let matrix = py.allow_threads(|| {
        PathSimulator::default().simulate(
            &params,
            &mut ChaCha8Rng::seed_from_u64(seed),
            &CancellationToken::new(),
        )
    })?;
    Ok(vec_to_numpy_f64(py, matrix.final_values()))
}

/// Descriptive statistics of the historical series backing `ticker`.
#[pyfunction]
#[pyo3(signature = (ticker, years=1, interval="1d", offline=false))]
pub fn historical_statistics(
    py: Python<'_>,
    ticker: &str,
    years: u32,
    interval: &str,
    offline: bool,
) -> PyResult<PyObject> {
    let interval: Interval = interval.parse()?;
    let config = ProviderConfig {
        offline,
        ..ProviderConfig::default()
    };
    let (source, stats) = py.allow_threads(|| {
        let service = MarketDataService::new(config)?;
        let series = service.get_series(ticker, years, interval);
        summarize(&series).map(|stats| (series.source, stats))
    })?;

    let dict = pyo3::types::PyDict::new(py);
    dict.set_item("synthetic", source == crate::core::types::DataSource::Synthetic)?;
    dict.set_item("mean_daily_return", stats.mean_daily_return)?;
    dict.set_item("std_daily_return", stats.std_daily_return)?;
    dict.set_item("annual_return", stats.annual_return)?;
    dict.set_item("annual_volatility", stats.annual_volatility)?;
    dict.set_item("sharpe_ratio", stats.sharpe_ratio)?;
    dict.set_item("max_drawdown", stats.max_drawdown)?;
    dict.set_item("total_return", stats.total_return)?;
    dict.set_item("current_price", stats.current_price)?;
    dict.set_item("data_points", stats.data_points)?;
    Ok(dict.into())
}

// ============================================================================
// Indicator Functions
// ============================================================================

/// Simple Moving Average.
#[pyfunction]
pub fn sma<'py>(
    py: Python<'py>,
    data: PyReadonlyArray1<f64>,
    period: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let vec = numpy_to_vec_f64(data)?;
    let result = indicators::trend::sma(&vec, period)?;
    Ok(vec_to_numpy_f64(py, result))
}
