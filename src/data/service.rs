//! Market-data service with a total contract: it always returns usable data.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::ProviderConfig;
use crate::core::error::QuantaError;
use crate::core::types::{DataSource, Interval, ReturnSeries, MAX_LOOKBACK_YEARS};
use crate::core::Result;

use super::cache::{CacheKey, SeriesCache};
use super::provider::{normalize_bars, BarProvider, FetchRequest};
use super::synthetic::synthesize_series;
use super::yahoo::YahooProvider;

/// Fetches historical return series, falling back to synthetic data.
///
/// Upstream failures (timeouts, HTTP errors, malformed or short payloads) are
/// logged and absorbed; [`get_series`](Self::get_series) never fails. Only live
/// series are cached.
pub struct MarketDataService {
    config: ProviderConfig,
    provider: Box<dyn BarProvider>,
    cache: SeriesCache,
    clock: Arc<dyn Clock>,
    rng: Mutex<ChaCha8Rng>,
}

impl MarketDataService {
    /// Service backed by the Yahoo chart API and the system clock.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let provider = YahooProvider::new(&config)?;
        Ok(Self::with_provider(config, Box::new(provider), Arc::new(SystemClock)))
    }

    /// Service with an explicit provider and clock.
    pub fn with_provider(
        config: ProviderConfig,
        provider: Box<dyn BarProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rng = match config.synthetic_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            cache: SeriesCache::new(config.cache_ttl(), clock.clone()),
            config,
            provider,
            clock,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Return series for `ticker` over the last `years` years, clamped to
    /// `1..=MAX_LOOKBACK_YEARS`. Synthetic fallbacks are always daily.
    pub fn get_series(&self, ticker: &str, years: u32, interval: Interval) -> ReturnSeries {
        let ticker = ticker.trim().to_ascii_uppercase();
        let years = years.clamp(1, MAX_LOOKBACK_YEARS);

        if self.config.offline {
            debug!(%ticker, "offline mode, synthesizing");
            return self.synthesize(&ticker, years);
        }

        let key = CacheKey::new(ticker.clone(), years, interval);
        if let Some(series) = self.cache.get(&key) {
            debug!(%ticker, years, %interval, "cache hit");
            return series;
        }

        match self.fetch_live(&ticker, years, interval) {
            Ok(series) => {
                info!(%ticker, points = series.len(), provider = self.provider.name(), "fetched live data");
                self.cache.insert(key, series.clone());
                series
            }
            Err(err) => {
                warn!(%ticker, error = %err, "live data unavailable, falling back to synthetic series");
                self.synthesize(&ticker, years)
            }
        }
    }

    fn fetch_live(&self, ticker: &str, years: u32, interval: Interval) -> Result<ReturnSeries> {
        let end = self.clock.now();
        let request = FetchRequest {
            ticker: ticker.to_string(),
            start: end - Duration::days(i64::from(years) * 365),
            end,
            interval,
        };

        let bars = normalize_bars(self.provider.fetch_bars(&request)?);
        if bars.is_empty() {
            return Err(QuantaError::upstream(ticker, "provider returned no bars"));
        }

        let series = ReturnSeries::from_bars(ticker, interval, DataSource::Live, bars)?;
        if series.len() < self.config.min_observations {
            return Err(QuantaError::insufficient_data(
                self.config.min_observations,
                series.len(),
            ));
        }
        Ok(series)
    }

    fn synthesize(&self, ticker: &str, years: u32) -> ReturnSeries {
        let end = self.clock.now().date_naive();
        let series = {
            let mut rng = self.rng.lock();
            synthesize_series(ticker, years, end, &mut *rng)
        };
        info!(%ticker, points = series.len(), "generated synthetic series");
        series
    }
}
