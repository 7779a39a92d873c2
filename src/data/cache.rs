//! Time-bounded, thread-safe cache of fetched return series.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::core::clock::Clock;
use crate::core::types::{Interval, ReturnSeries};

/// Cache key: one entry per (ticker, lookback years, interval).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub years: u32,
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(ticker: impl Into<String>, years: u32, interval: Interval) -> Self {
        Self {
            ticker: ticker.into(),
            years,
            interval,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: ReturnSeries,
    stored_at: DateTime<Utc>,
}

/// Series cache with a freshness window measured on an injected clock.
pub struct SeriesCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SeriesCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards counts as fresh.
        (now - entry.stored_at)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true)
    }

    /// Fresh entry for `key`, if any. A stale entry is evicted.
    pub fn get(&self, key: &CacheKey) -> Option<ReturnSeries> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.series.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write();
        // Another caller may have refreshed it between the two locks.
        if let Some(entry) = entries.get(key) {
            if self.is_fresh(entry, now) {
                return Some(entry.series.clone());
            }
        }
        entries.remove(key);
        None
    }

    /// Store `series`, replacing any previous entry and dropping stale ones.
    pub fn insert(&self, key: CacheKey, series: ReturnSeries) {
        let now = self.clock.now();
        let entry = CacheEntry {
            series,
            stored_at: now,
        };
        let mut entries = self.entries.write();
        entries.retain(|_, cached| self.is_fresh(cached, now));
        entries.insert(key, entry);
    }

    /// Drop stale entries and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    /// Number of stored entries. Stale entries not yet evicted are counted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::types::{DataSource, PriceBar};
    use chrono::TimeZone;

    fn series() -> ReturnSeries {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = (0..3)
            .map(|i| PriceBar {
                timestamp: t0 + chrono::Duration::days(i),
                open: 10.0,
                high: 10.0,
                low: 10.0,
                close: 10.0 + i as f64,
                volume: 1,
            })
            .collect();
        ReturnSeries::from_bars("SPY", Interval::OneDay, DataSource::Live, bars).unwrap()
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let cache = SeriesCache::new(Duration::from_secs(3600), clock.clone());
        let key = CacheKey::new("SPY", 5, Interval::OneDay);

        cache.insert(key.clone(), series());
        clock.advance(chrono::Duration::minutes(59));
        assert!(cache.get(&key).is_some());

        clock.advance(chrono::Duration::minutes(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_entries_do_not_accumulate() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let cache = SeriesCache::new(Duration::from_secs(3600), clock.clone());

        for ticker in ["SPY", "QQQ", "AAPL", "MSFT"] {
            cache.insert(CacheKey::new(ticker, 1, Interval::OneDay), series());
        }
        assert_eq!(cache.len(), 4);

        clock.advance(chrono::Duration::hours(2));
        cache.insert(CacheKey::new("VTI", 1, Interval::OneDay), series());
        assert_eq!(cache.len(), 1);

        clock.advance(chrono::Duration::hours(2));
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_distinct() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let cache = SeriesCache::new(Duration::from_secs(60), clock);

        cache.insert(CacheKey::new("SPY", 5, Interval::OneDay), series());
        assert!(cache.get(&CacheKey::new("SPY", 3, Interval::OneDay)).is_none());
        assert!(cache.get(&CacheKey::new("SPY", 5, Interval::OneWeek)).is_none());
        assert!(cache.get(&CacheKey::new("SPY", 5, Interval::OneDay)).is_some());
    }
}
