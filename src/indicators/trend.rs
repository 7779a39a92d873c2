//! Trend indicators over closing prices.

use crate::core::error::QuantaError;
use crate::core::types::ReturnSeries;
use crate::core::Result;

/// Default moving-average windows for charting.
pub const DEFAULT_MA_WINDOWS: [usize; 3] = [20, 50, 200];

/// Simple Moving Average.
///
/// # Arguments
/// * `data` - Price data
/// * `period` - Lookback period
///
/// # Returns
/// Vector of SMA values (NaN for warmup period)
pub fn sma(data: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(QuantaError::invalid_parameter("SMA period must be > 0"));
    }
    if data.is_empty() {
        return Ok(vec![]);
    }

    let n = data.len();
    let mut result = vec![f64::NAN; n];

    if period > n {
        return Ok(result);
    }

    let mut sum: f64 = data[..period].iter().sum();
    result[period - 1] = sum / period as f64;

    // Sliding window for remaining values
    for i in period..n {
        sum = sum - data[i - period] + data[i];
        result[i] = sum / period as f64;
    }

    Ok(result)
}

/// A moving average column labelled by its window.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    pub window: usize,
    pub values: Vec<f64>,
}

/// Simple moving averages of a series' closes, one column per window.
pub fn moving_averages(series: &ReturnSeries, windows: &[usize]) -> Result<Vec<MovingAverage>> {
    let closes = series.closes();
    windows
        .iter()
        .map(|&window| {
            Ok(MovingAverage {
                window,
                values: sma(&closes, window)?,
            })
        })
        .collect()
}
