//! Descriptive risk/return statistics of a historical return series.

use crate::core::error::{QuantaError, Result};
use crate::core::types::{ReturnSeries, StatsReport, TRADING_DAYS_PER_YEAR};
use crate::metrics::drawdown::drawdown_curve;
use crate::metrics::streaming::RunningStats;

/// Annualized volatility below this is treated as zero.
const VOLATILITY_EPSILON: f64 = 1e-12;

/// Reduce a return series to a [`StatsReport`].
///
/// Moments use the sample (n - 1) standard deviation of simple daily returns.
/// Drawdowns are measured on the cumulative growth of one unit, `prod(1 + r)`.
pub fn summarize(series: &ReturnSeries) -> Result<StatsReport> {
    if series.is_empty() || series.bars.is_empty() {
        return Err(QuantaError::empty_data("return statistics"));
    }

    let moments = RunningStats::from_slice(&series.returns);
    let mean = moments.mean();
    let std = moments.std_dev();

    let annual_return = mean * TRADING_DAYS_PER_YEAR;
    let annual_volatility = std * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe_ratio = if annual_volatility > VOLATILITY_EPSILON {
        annual_return / annual_volatility
    } else {
        0.0
    };

    let mut growth = 1.0;
    let cumulative: Vec<f64> = series
        .returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r;
            growth
        })
        .collect();
    let max_drawdown = drawdown_curve(&cumulative)
        .into_iter()
        .fold(0.0f64, f64::min);

    let first_close = series.bars[0].close;
    let current_price = series.bars[series.bars.len() - 1].close;

    Ok(StatsReport {
        mean_daily_return: mean,
        std_daily_return: std,
        annual_return,
        annual_volatility,
        sharpe_ratio,
        max_drawdown,
        total_return: current_price / first_close - 1.0,
        current_price,
        data_points: series.len(),
    })
}
