//! Core data types for quantasim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::error::{QuantaError, Result};

/// Type alias for price values.
pub type Price = f64;

/// Trading days used to annualize daily figures and convert years to steps.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Longest projection horizon accepted, in years.
pub const MAX_HORIZON_YEARS: f64 = 100.0;

/// Longest historical lookback requested or synthesized, in years.
pub const MAX_LOOKBACK_YEARS: u32 = 100;

/// Trading days per month, used for down-sampling sample paths.
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// Bar interval requested from the market-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
}

impl Interval {
    /// Wire representation understood by the upstream chart API.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::OneDay
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = QuantaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "60m" => Ok(Interval::OneHour),
            "1d" => Ok(Interval::OneDay),
            "1wk" | "1w" => Ok(Interval::OneWeek),
            "1mo" => Ok(Interval::OneMonth),
            other => Err(QuantaError::invalid_parameter(format!(
                "unsupported interval '{}'",
                other
            ))),
        }
    }
}

/// OHLCV data for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

/// Where a return series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Fetched from the upstream market-data provider.
    Live,
    /// Synthesized locally after the upstream attempt failed.
    Synthetic,
}

/// Price history with derived simple and log returns.
///
/// `bars[i]` is the bar whose close produced `returns[i]` and `log_returns[i]`;
/// the leading bar of the raw history is consumed by the derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub ticker: String,
    pub interval: Interval,
    pub source: DataSource,
    pub bars: Vec<PriceBar>,
    pub returns: Vec<f64>,
    pub log_returns: Vec<f64>,
}

impl ReturnSeries {
    /// Derive returns from a chronological bar history and drop the first bar.
    pub fn from_bars(
        ticker: impl Into<String>,
        interval: Interval,
        source: DataSource,
        bars: Vec<PriceBar>,
    ) -> Result<Self> {
        if bars.len() < 2 {
            return Err(QuantaError::insufficient_data(2, bars.len()));
        }
        if let Some(bad) = bars.iter().find(|b| !(b.close.is_finite() && b.close > 0.0)) {
            return Err(QuantaError::invalid_parameter(format!(
                "close at {} is not a positive price: {}",
                bad.timestamp, bad.close
            )));
        }

        Ok(Self::derive(ticker, interval, source, bars))
    }

    /// Derivation without validation; callers guarantee positive closes.
    pub(crate) fn derive(
        ticker: impl Into<String>,
        interval: Interval,
        source: DataSource,
        mut bars: Vec<PriceBar>,
    ) -> Self {
        let mut returns = Vec::with_capacity(bars.len().saturating_sub(1));
        let mut log_returns = Vec::with_capacity(bars.len().saturating_sub(1));
        for pair in bars.windows(2) {
            let ratio = pair[1].close / pair[0].close;
            returns.push(ratio - 1.0);
            log_returns.push(ratio.ln());
        }
        if !bars.is_empty() {
            bars.remove(0);
        }

        Self {
            ticker: ticker.into(),
            interval,
            source,
            bars,
            returns,
            log_returns,
        }
    }

    /// Number of return observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Closing prices aligned with the returns.
    pub fn closes(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Inputs to the path simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub initial_investment: f64,
    pub num_simulations: usize,
    pub horizon_years: f64,
    /// Expected daily return (mu).
    pub daily_drift: f64,
    /// Daily standard deviation of returns (sigma).
    pub daily_volatility: f64,
}

impl SimulationParameters {
    /// Create validated simulation parameters.
    pub fn new(
        initial_investment: f64,
        num_simulations: usize,
        horizon_years: f64,
        daily_drift: f64,
        daily_volatility: f64,
    ) -> Result<Self> {
        let params = Self {
            initial_investment,
            num_simulations,
            horizon_years,
            daily_drift,
            daily_volatility,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameter contract.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_investment.is_finite() && self.initial_investment > 0.0) {
            return Err(QuantaError::invalid_parameter(format!(
                "initial_investment must be positive, got {}",
                self.initial_investment
            )));
        }
        if self.num_simulations == 0 {
            return Err(QuantaError::invalid_parameter("num_simulations must be at least 1"));
        }
        if !(self.horizon_years.is_finite() && self.horizon_years > 0.0) {
            return Err(QuantaError::invalid_parameter(format!(
                "horizon_years must be positive, got {}",
                self.horizon_years
            )));
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(QuantaError::invalid_parameter(format!(
                "horizon_years must be at most {}, got {}",
                MAX_HORIZON_YEARS, self.horizon_years
            )));
        }
        if !self.daily_drift.is_finite() {
            return Err(QuantaError::invalid_parameter("daily_drift must be finite"));
        }
        if !(self.daily_volatility.is_finite() && self.daily_volatility >= 0.0) {
            return Err(QuantaError::invalid_parameter(format!(
                "daily_volatility must be non-negative, got {}",
                self.daily_volatility
            )));
        }
        if self.trading_days() == 0 {
            return Err(QuantaError::invalid_parameter(format!(
                "horizon of {} years is shorter than one trading day",
                self.horizon_years
            )));
        }
        self.cells()?;
        Ok(())
    }

    /// Size of the path matrix, `num_simulations * trading_days`.
    pub fn cells(&self) -> Result<usize> {
        self.num_simulations
            .checked_mul(self.trading_days())
            .ok_or_else(|| {
                QuantaError::invalid_parameter(format!(
                    "{} simulations over {} days overflow the path matrix",
                    self.num_simulations,
                    self.trading_days()
                ))
            })
    }

    /// Number of simulated days, `round(horizon_years * 252)`.
    #[inline]
    pub fn trading_days(&self) -> usize {
        (self.horizon_years * TRADING_DAYS_PER_YEAR).round() as usize
    }
}

/// Percentiles of the final-day value distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// One down-sampled row of the sample paths.
///
/// Serializes flat as `{"day": .., "month": .., "path_0": .., "path_1": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePathPoint {
    pub day: usize,
    pub month: usize,
    pub values: Vec<f64>,
}

impl Serialize for SamplePathPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.values.len()))?;
        map.serialize_entry("day", &self.day)?;
        map.serialize_entry("month", &self.month)?;
        for (idx, value) in self.values.iter().enumerate() {
            map.serialize_entry(&format!("path_{}", idx), value)?;
        }
        map.end()
    }
}

/// Summary of a simulated path ensemble.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub percentiles: Percentiles,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Mean ROI in percent.
    pub mean_roi: f64,
    /// Median ROI in percent.
    pub median_roi: f64,
    /// Share of simulations ending above the initial investment, in percent.
    pub probability_of_profit: f64,
    pub sharpe_ratio: f64,
    /// Mean over simulations of each path's worst drawdown, as a negative fraction.
    pub avg_max_drawdown: f64,
    pub initial_investment: f64,
    pub sample_paths: Vec<SamplePathPoint>,
}

/// Descriptive statistics of a historical return series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub mean_daily_return: f64,
    pub std_daily_return: f64,
    pub annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
    pub current_price: Price,
    pub data_points: usize,
}
