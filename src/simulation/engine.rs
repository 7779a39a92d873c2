//! End-to-end projection: ticker in, serializable report out.

use std::time::Duration;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::EngineConfig;
use crate::core::types::{
    DataSource, Interval, ReturnSeries, SimulationParameters, SimulationResult, StatsReport,
    MAX_LOOKBACK_YEARS,
};
use crate::core::Result;
use crate::data::MarketDataService;
use crate::metrics::stats::summarize;
use crate::metrics::streaming::RunningStats;

use super::cancel::CancellationToken;
use super::gbm::PathSimulator;
use super::matrix::PathMatrix;
use super::summary::summarize_paths_with;

/// Stream reserved for choosing sample paths, away from the simulation streams.
const SAMPLING_STREAM: u64 = u64::MAX;

/// Caller input for one projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionRequest {
    pub ticker: String,
    pub initial_investment: f64,
    pub num_simulations: usize,
    /// Projection horizon; also the lookback of the historical window, rounded up.
    pub years: f64,
    pub interval: Interval,
    /// Fixes all randomness of this run when set.
    pub seed: Option<u64>,
}

impl Default for ProjectionRequest {
    fn default() -> Self {
        Self {
            ticker: "SPY".to_string(),
            initial_investment: 10_000.0,
            num_simulations: 1_000,
            years: 5.0,
            interval: Interval::OneDay,
            seed: None,
        }
    }
}

impl ProjectionRequest {
    /// Check the numeric contract before any data is fetched.
    pub fn validate(&self) -> Result<()> {
        SimulationParameters::new(
            self.initial_investment,
            self.num_simulations,
            self.years,
            0.0,
            0.0,
        )
        .map(|_| ())
    }

    /// Whole years of history backing the projection, between one and
    /// [`MAX_LOOKBACK_YEARS`].
    pub fn lookback_years(&self) -> u32 {
        (self.years.ceil().min(f64::from(MAX_LOOKBACK_YEARS)) as u32).max(1)
    }
}

/// Distribution parameters the simulation actually ran with.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectionParameters {
    pub mu: f64,
    pub sigma: f64,
    pub days: usize,
    pub initial_investment: f64,
}

/// Full projection output.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub ticker: String,
    pub data_source: DataSource,
    pub num_simulations: usize,
    pub seed: u64,
    pub parameters: ProjectionParameters,
    pub statistics: SimulationResult,
    pub historical: StatsReport,
}

/// Runs projections against a market-data service.
pub struct ProjectionEngine {
    config: EngineConfig,
    market: MarketDataService,
    simulator: PathSimulator,
    seeds: Mutex<ChaCha8Rng>,
}

impl ProjectionEngine {
    /// Engine backed by the live provider.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let market = MarketDataService::new(config.provider.clone())?;
        Ok(Self::with_market(config, market))
    }

    /// Engine with an explicit market-data service.
    pub fn with_market(config: EngineConfig, market: MarketDataService) -> Self {
        let seeds = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            simulator: PathSimulator::new(config.simulation.clone()),
            config,
            market,
            seeds: Mutex::new(seeds),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn market(&self) -> &MarketDataService {
        &self.market
    }

    /// Run a projection, bounded by the configured timeout if any.
    pub fn run(&self, request: &ProjectionRequest) -> Result<ProjectionReport> {
        let token = match self.config.simulation.timeout_ms {
            Some(ms) => CancellationToken::with_timeout(Duration::from_millis(ms)),
            None => CancellationToken::new(),
        };
        self.run_with_token(request, &token)
    }

    /// Run a projection that can be cancelled through `token`.
    pub fn run_with_token(
        &self,
        request: &ProjectionRequest,
        token: &CancellationToken,
    ) -> Result<ProjectionReport> {
        request.validate()?;
        let series =
            self.market
                .get_series(&request.ticker, request.lookback_years(), request.interval);
        self.project_series(&series, request, token)
    }

    /// Project from an already loaded series.
    pub fn project_series(
        &self,
        series: &ReturnSeries,
        request: &ProjectionRequest,
        token: &CancellationToken,
    ) -> Result<ProjectionReport> {
        let historical = summarize(series)?;
        let moments = RunningStats::from_slice(&series.returns);
        let params = SimulationParameters::new(
            request.initial_investment,
            request.num_simulations,
            request.years,
            moments.mean(),
            moments.std_dev(),
        )?;
        let seed = request.seed.unwrap_or_else(|| self.seeds.lock().gen());

        info!(
            ticker = %series.ticker,
            source = ?series.source,
            mu = params.daily_drift,
            sigma = params.daily_volatility,
            days = params.trading_days(),
            simulations = params.num_simulations,
            seed,
            "running projection"
        );

        let matrix = self.simulate(&params, seed, token)?;

        let mut sampler = ChaCha8Rng::seed_from_u64(seed);
        sampler.set_stream(SAMPLING_STREAM);
        let statistics = summarize_paths_with(
            &matrix,
            params.initial_investment,
            &self.config.simulation,
            &mut sampler,
        )?;

        Ok(ProjectionReport {
            ticker: series.ticker.clone(),
            data_source: series.source,
            num_simulations: params.num_simulations,
            seed,
            parameters: ProjectionParameters {
                mu: params.daily_drift,
                sigma: params.daily_volatility,
                days: params.trading_days(),
                initial_investment: params.initial_investment,
            },
            statistics,
            historical,
        })
    }

    fn simulate(
        &self,
        params: &SimulationParameters,
        seed: u64,
        token: &CancellationToken,
    ) -> Result<PathMatrix> {
        let cells = params.cells()?;
        if cells >= self.config.simulation.parallel_threshold {
            debug!(cells, "using parallel simulator");
            self.simulator.simulate_parallel(params, seed, token)
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            self.simulator.simulate(params, &mut rng, token)
        }
    }
}
