//! Yahoo Finance chart API client.

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::ProviderConfig;
use crate::core::error::QuantaError;
use crate::core::types::PriceBar;
use crate::core::Result;

use super::provider::{normalize_bars, BarProvider, FetchRequest};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Blocking client for `/v8/finance/chart`.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    /// Build a client that enforces the configured request timeout.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent("Mozilla/5.0")
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl BarProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_bars(&self, request: &FetchRequest) -> Result<Vec<PriceBar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.ticker);
        debug!(ticker = %request.ticker, %url, "requesting chart");

        let body = self
            .client
            .get(&url)
            .query(&[
                ("period1", request.start.timestamp().to_string()),
                ("period2", request.end.timestamp().to_string()),
                ("interval", request.interval.as_str().to_string()),
                ("events", "history".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        parse_chart(&request.ticker, &body)
    }
}

/// Decode a chart payload into adjusted, chronological bars.
///
/// Prices are scaled by `adjclose / close` so splits and dividends do not show
/// up as returns. Rows without a close are skipped; missing open/high/low fall
/// back to the close and missing volume to zero.
pub fn parse_chart(ticker: &str, body: &str) -> Result<Vec<PriceBar>> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| QuantaError::parse(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(QuantaError::upstream(
            ticker,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| QuantaError::upstream(ticker, "empty chart result"))?;
    let timestamps = data
        .timestamp
        .ok_or_else(|| QuantaError::upstream(ticker, "no timestamps"))?;
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| QuantaError::upstream(ticker, "no quote block"))?;
    let adjclose = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);

    let at = |column: &Vec<Option<f64>>, i: usize| column.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        let factor = match adjclose.as_ref().and_then(|a| at(a, i)) {
            Some(adj) if close > 0.0 => adj / close,
            _ => 1.0,
        };
        bars.push(PriceBar {
            timestamp,
            open: at(&quote.open, i).unwrap_or(close) * factor,
            high: at(&quote.high, i).unwrap_or(close) * factor,
            low: at(&quote.low, i).unwrap_or(close) * factor,
            close: close * factor,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Err(QuantaError::upstream(ticker, "no rows with a close price"));
    }

    Ok(normalize_bars(bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL"},
                "timestamp": [1700006400, 1699920000, 1700092800],
                "indicators": {
                    "quote": [{
                        "open":   [101.0, 99.0, null],
                        "high":   [103.0, 100.0, 106.0],
                        "low":    [100.0, 98.0, 104.0],
                        "close":  [102.0, 100.0, null],
                        "volume": [2000, 1000, 3000]
                    }],
                    "adjclose": [{"adjclose": [51.0, 50.0, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_adjusts_and_sorts() {
        let bars = parse_chart("AAPL", SAMPLE).unwrap();

        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
        assert!((bars[0].close - 50.0).abs() < 1e-12);
        assert!((bars[0].open - 49.5).abs() < 1e-12);
        assert!((bars[1].close - 51.0).abs() < 1e-12);
        assert!((bars[1].high - 51.5).abs() < 1e-12);
        assert_eq!(bars[1].volume, 2000);
    }

    #[test]
    fn test_parse_upstream_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#;
        let err = parse_chart("NOPE", body).unwrap_err();
        assert!(matches!(err, QuantaError::Upstream { .. }));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_chart("X", "<html>"), Err(QuantaError::Parse { .. })));
    }

    #[test]
    fn test_parse_without_closes() {
        let body = r#"{"chart": {"result": [{"timestamp": [1], "indicators": {"quote": [{"open": [1.0]}]}}], "error": null}}"#;
        assert!(parse_chart("X", body).is_err());
    }
}
