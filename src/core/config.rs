//! Runtime configuration for the data provider and the simulator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{QuantaError, Result};

/// Market-data provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the chart API.
    pub base_url: String,
    /// Hard timeout for one upstream request, in seconds.
    pub fetch_timeout_secs: u64,
    /// How long a fetched series stays fresh in the cache, in seconds.
    pub cache_ttl_secs: u64,
    /// Minimum number of return observations for live data to be usable.
    pub min_observations: usize,
    /// Skip the upstream entirely and always synthesize.
    pub offline: bool,
    /// Seed for synthetic series. `None` draws from entropy.
    pub synthetic_seed: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            fetch_timeout_secs: 10,
            cache_ttl_secs: 3600,
            min_observations: 100,
            offline: false,
            synthetic_seed: None,
        }
    }
}

impl ProviderConfig {
    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[inline]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Path simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of paths included in the down-sampled sample output.
    pub sample_paths: usize,
    /// Day stride between sample path rows.
    pub sample_stride: usize,
    /// Paths per parallel work unit; each unit owns one RNG stream.
    pub chunk_size: usize,
    /// Cells (`num_simulations * trading_days`) above which simulation runs on rayon.
    pub parallel_threshold: usize,
    /// Wall-clock budget for one simulation, in milliseconds. `None` is unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_paths: 10,
            sample_stride: super::types::TRADING_DAYS_PER_MONTH,
            chunk_size: 256,
            parallel_threshold: 250_000,
            timeout_ms: None,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub provider: ProviderConfig,
    pub simulation: SimulationConfig,
    /// Master seed for simulations. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Parse a JSON document; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| QuantaError::invalid_parameter(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.simulation.sample_stride == 0 {
            return Err(QuantaError::invalid_parameter("sample_stride must be at least 1"));
        }
        if self.simulation.chunk_size == 0 {
            return Err(QuantaError::invalid_parameter("chunk_size must be at least 1"));
        }
        if self.provider.fetch_timeout_secs == 0 {
            return Err(QuantaError::invalid_parameter("fetch_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.provider.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.provider.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.provider.min_observations, 100);
        assert_eq!(config.simulation.sample_paths, 10);
        assert_eq!(config.simulation.sample_stride, 21);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json(r#"{"seed": 7, "provider": {"offline": true}}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(config.provider.offline);
        assert_eq!(config.provider.min_observations, 100);
        assert_eq!(config.simulation.chunk_size, 256);
    }

    #[test]
    fn test_rejects_zero_stride() {
        let err = EngineConfig::from_json(r#"{"simulation": {"sample_stride": 0}}"#);
        assert!(err.is_err());
    }
}
