//! Technical indicators for quantasim.
//!
//! Pure functions over slices; NaN marks the warmup period.

pub mod trend;

pub use trend::{moving_averages, sma, MovingAverage, DEFAULT_MA_WINDOWS};
