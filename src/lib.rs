// Suppress warning from PyO3 macro expansion (fixed in newer PyO3 versions)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

//! quantasim - Monte Carlo price projection for a single ticker.
//!
//! This crate provides:
//! - Historical market data with caching and a synthetic fallback
//! - Descriptive statistics and moving averages of return series
//! - Parallel Geometric Brownian Motion path simulation
//! - Percentile, ROI, probability-of-profit and drawdown summaries

pub mod core;
pub mod data;
pub mod indicators;
pub mod metrics;
#[cfg(feature = "python")]
pub mod python;
pub mod simulation;

pub use crate::core::{EngineConfig, QuantaError, Result};
pub use crate::data::MarketDataService;
pub use crate::simulation::{ProjectionEngine, ProjectionReport, ProjectionRequest};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _quantasim(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::bindings::PyProjection>()?;

    m.add_function(wrap_pyfunction!(python::bindings::run_projection, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::simulate_final_values, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::historical_statistics, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::sma, m)?)?;

    Ok(())
}
