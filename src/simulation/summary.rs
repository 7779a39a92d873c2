//! Reduction of a path ensemble to the projection result.

use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;

use crate::core::config::SimulationConfig;
use crate::core::error::{QuantaError, Result};
use crate::core::types::{
    Percentiles, SamplePathPoint, SimulationResult, TRADING_DAYS_PER_MONTH, TRADING_DAYS_PER_YEAR,
};
use crate::metrics::drawdown::max_drawdown;
use crate::metrics::streaming::RunningStats;

use super::matrix::PathMatrix;

/// Percentile of ascending `sorted` data by linear interpolation between
/// order statistics (rank `pct / 100 * (n - 1)`).
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let weight = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * weight
        }
    }
}

/// Summarize with the default sampling configuration.
pub fn summarize_paths<R: Rng + ?Sized>(
    matrix: &PathMatrix,
    initial_investment: f64,
    rng: &mut R,
) -> Result<SimulationResult> {
    summarize_paths_with(matrix, initial_investment, &SimulationConfig::default(), rng)
}

/// Reduce `matrix` to a [`SimulationResult`].
///
/// The Sharpe ratio here is `mean / std` of the per-simulation ROI fractions
/// scaled by `sqrt(252)`, applied to whole-horizon returns rather than daily
/// ones. Consumers depend on this exact figure, so it is kept as is.
pub fn summarize_paths_with<R: Rng + ?Sized>(
    matrix: &PathMatrix,
    initial_investment: f64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationResult> {
    if !(initial_investment.is_finite() && initial_investment > 0.0) {
        return Err(QuantaError::invalid_parameter(format!(
            "initial_investment must be positive, got {}",
            initial_investment
        )));
    }
    if config.sample_stride == 0 {
        return Err(QuantaError::invalid_parameter("sample_stride must be at least 1"));
    }

    let finals = matrix.final_values();
    let n = finals.len();

    let mut sorted = finals.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let percentiles = Percentiles {
        p5: percentile(&sorted, 5.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p95: percentile(&sorted, 95.0),
    };

    let value_stats = RunningStats::from_slice(&finals);

    let roi = |v: f64| (v - initial_investment) / initial_investment;
    let roi_stats = RunningStats::from_slice(&finals.iter().map(|&v| roi(v)).collect::<Vec<_>>());
    let roi_std = roi_stats.std_dev_population();
    let sharpe_ratio = if roi_std > 0.0 {
        roi_stats.mean() / roi_std * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let profitable = finals.iter().filter(|&&v| v > initial_investment).count();

    // Collected in order so the sum is identical across thread counts.
    let drawdowns: Vec<f64> = matrix
        .as_slice()
        .par_chunks(matrix.trading_days())
        .map(max_drawdown)
        .collect();
    let avg_max_drawdown = drawdowns.iter().sum::<f64>() / n as f64;

    let sample_paths = sample_paths(matrix, config, rng);

    Ok(SimulationResult {
        percentiles,
        mean: value_stats.mean(),
        median: percentiles.p50,
        std: value_stats.std_dev_population(),
        min: value_stats.min(),
        max: value_stats.max(),
        mean_roi: roi_stats.mean() * 100.0,
        median_roi: roi(percentiles.p50) * 100.0,
        probability_of_profit: profitable as f64 / n as f64 * 100.0,
        sharpe_ratio,
        avg_max_drawdown,
        initial_investment,
        sample_paths,
    })
}

/// Down-sample up to `config.sample_paths` randomly chosen paths, one row every
/// `config.sample_stride` days starting at day 0.
fn sample_paths<R: Rng + ?Sized>(
    matrix: &PathMatrix,
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<SamplePathPoint> {
    let n = matrix.num_simulations();
    let chosen = index::sample(rng, n, config.sample_paths.min(n)).into_vec();

    (0..matrix.trading_days())
        .step_by(config.sample_stride)
        .map(|day| SamplePathPoint {
            day,
            month: day / TRADING_DAYS_PER_MONTH,
            values: chosen.iter().map(|&sim| matrix.get(day, sim)).collect(),
        })
        .collect()
}
