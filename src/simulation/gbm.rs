//! Monte Carlo forward simulation of a single asset.
//!
//! Geometric Brownian Motion with daily steps (dt = 1):
//! `S[t] = S[t-1] * exp((mu - sigma^2 / 2) + sigma * Z)`, `Z ~ N(0, 1)` i.i.d.
//! per (day, simulation). Parallelized via Rayon across simulation chunks.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::core::error::QuantaError;
use crate::core::types::SimulationParameters;
use crate::core::Result;

use super::cancel::CancellationToken;
use super::matrix::PathMatrix;

/// Per-step log-space increments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmStep {
    /// `(mu - 0.5 * sigma^2) * dt`
    pub drift: f64,
    /// `sigma * sqrt(dt)`
    pub diffusion: f64,
}

impl GbmStep {
    pub fn from_params(params: &SimulationParameters) -> Self {
        let dt = 1.0_f64;
        let sigma = params.daily_volatility;
        Self {
            drift: (params.daily_drift - 0.5 * sigma * sigma) * dt,
            diffusion: sigma * dt.sqrt(),
        }
    }

    /// Growth factor for one shock.
    #[inline]
    pub fn factor(&self, z: f64) -> f64 {
        (self.drift + self.diffusion * z).exp()
    }
}

/// Path simulator.
#[derive(Debug, Clone, Default)]
pub struct PathSimulator {
    pub config: SimulationConfig,
}

impl PathSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Sequential simulation driven by an injected generator.
    ///
    /// Shocks are drawn day by day, and within a day simulation by simulation,
    /// so a seeded generator reproduces the matrix exactly.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
        token: &CancellationToken,
    ) -> Result<PathMatrix> {
        params.validate()?;
        let days = params.trading_days();
        let sims = params.num_simulations;
        let step = GbmStep::from_params(params);

        let mut data = vec![0.0; params.cells()?];
        for j in 0..sims {
            data[j * days] = params.initial_investment;
        }

        for t in 1..days {
            if token.is_cancelled() {
                return Err(QuantaError::Cancelled {
                    completed: 0,
                    total: sims,
                });
            }
            for j in 0..sims {
                let z: f64 = StandardNormal.sample(rng);
                let idx = j * days + t;
                data[idx] = data[idx - 1] * step.factor(z);
            }
        }

        PathMatrix::new(days, sims, data)
    }

    /// Parallel simulation driven by a seed.
    ///
    /// Simulations are split into chunks of `config.chunk_size`; chunk `c` draws
    /// from ChaCha stream `c` of `seed`. The result therefore depends only on
    /// the seed and chunk size, never on the number of worker threads.
    pub fn simulate_parallel(
        &self,
        params: &SimulationParameters,
        seed: u64,
        token: &CancellationToken,
    ) -> Result<PathMatrix> {
        params.validate()?;
        let days = params.trading_days();
        let sims = params.num_simulations;
        let step = GbmStep::from_params(params);
        let chunk_size = self.config.chunk_size.max(1);
        let completed = AtomicUsize::new(0);

        debug!(sims, days, chunk_size, threads = rayon::current_num_threads(), "parallel simulation");

        let mut data = vec![0.0; params.cells()?];
        data.par_chunks_mut(chunk_size * days)
            .enumerate()
            .try_for_each(|(chunk_idx, block)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(chunk_idx as u64);

                for path in block.chunks_exact_mut(days) {
                    if token.is_cancelled() {
                        return Err(QuantaError::Cancelled {
                            completed: completed.load(Ordering::Relaxed),
                            total: sims,
                        });
                    }
                    let mut value = params.initial_investment;
                    path[0] = value;
                    for cell in path.iter_mut().skip(1) {
                        let z: f64 = StandardNormal.sample(&mut rng);
                        value *= step.factor(z);
                        *cell = value;
                    }
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            })?;

        PathMatrix::new(days, sims, data)
    }
}

/// Simulate GBM paths with the default configuration and no cancellation.
pub fn simulate_paths<R: Rng + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
) -> Result<PathMatrix> {
    PathSimulator::default().simulate(params, rng, &CancellationToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sims: usize, years: f64, mu: f64, sigma: f64) -> SimulationParameters {
        SimulationParameters::new(10_000.0, sims, years, mu, sigma).unwrap()
    }

    #[test]
    fn test_step_terms() {
        let step = GbmStep::from_params(&params(1, 1.0, 0.001, 0.02));
        assert!((step.drift - (0.001 - 0.0002)).abs() < 1e-15);
        assert!((step.diffusion - 0.02).abs() < 1e-15);
    }

    #[test]
    fn test_shape_and_positivity() {
        let p = params(50, 1.0, 0.0003, 0.02);
        let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();

        assert_eq!(m.trading_days(), 252);
        assert_eq!(m.num_simulations(), 50);
        assert!(m.row(0).iter().all(|&v| v == 10_000.0));
        assert!(m.as_slice().iter().all(|&v| v > 0.0 && v.is_finite()));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let p = params(20, 0.5, 0.0003, 0.015);
        let a = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_volatility_is_exponential() {
        let p = params(5, 1.0, 0.001, 0.0);
        let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();

        for t in 0..m.trading_days() {
            let expected = 10_000.0 * (0.001 * t as f64).exp();
            for j in 0..m.num_simulations() {
                assert!((m.get(t, j) - expected).abs() / expected < 1e-9);
                assert_eq!(m.get(t, j), m.get(t, 0));
            }
        }
    }

    #[test]
    fn test_zero_drift_zero_volatility_is_flat() {
        let p = params(3, 1.0, 0.0, 0.0);
        let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert!(m.as_slice().iter().all(|&v| v == 10_000.0));
    }

    #[test]
    fn test_parallel_independent_of_thread_count() {
        let p = params(1_000, 0.25, 0.0002, 0.01);
        let sim = PathSimulator::new(SimulationConfig {
            chunk_size: 64,
            ..SimulationConfig::default()
        });
        let token = CancellationToken::new();

        let a = sim.simulate_parallel(&p, 99, &token).unwrap();
        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let b = single.install(|| sim.simulate_parallel(&p, 99, &token)).unwrap();

        assert_eq!(a, b);
        assert!(a.row(0).iter().all(|&v| v == 10_000.0));
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let p = params(100, 1.0, 0.0, 0.01);
        let token = CancellationToken::new();
        token.cancel();

        let sim = PathSimulator::default();
        assert!(matches!(
            sim.simulate_parallel(&p, 1, &token),
            Err(QuantaError::Cancelled { .. })
        ));
        assert!(matches!(
            sim.simulate(&p, &mut ChaCha8Rng::seed_from_u64(1), &token),
            Err(QuantaError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let bad = SimulationParameters {
            initial_investment: -1.0,
            num_simulations: 10,
            horizon_years: 1.0,
            daily_drift: 0.0,
            daily_volatility: 0.01,
        };
        assert!(simulate_paths(&bad, &mut ChaCha8Rng::seed_from_u64(1)).is_err());
    }
}
