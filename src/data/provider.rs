//! Upstream market-data capability.

use chrono::{DateTime, Utc};

use crate::core::types::{Interval, PriceBar};
use crate::core::Result;

/// One historical bar request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticker: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: Interval,
}

/// Source of historical OHLCV bars.
///
/// Implementations may fail, time out or return partial data; the
/// [`MarketDataService`](super::service::MarketDataService) absorbs all of it.
pub trait BarProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch chronological bars for `request`.
    fn fetch_bars(&self, request: &FetchRequest) -> Result<Vec<PriceBar>>;
}

/// Sort bars chronologically and keep the last bar for each timestamp.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.timestamp);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
