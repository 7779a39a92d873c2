//! Integration tests for the path simulator, summarizer and projection engine.

use quantasim::core::config::EngineConfig;
use quantasim::core::types::{DataSource, Interval, PriceBar, ReturnSeries, SimulationParameters};
use quantasim::metrics::stats::summarize;
use quantasim::simulation::{
    simulate_paths, summarize_paths, CancellationToken, PathSimulator, ProjectionEngine,
    ProjectionRequest,
};
use quantasim::MarketDataService;

use chrono::{Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn params(sims: usize, years: f64, mu: f64, sigma: f64) -> SimulationParameters {
    SimulationParameters::new(10_000.0, sims, years, mu, sigma).unwrap()
}

fn series_from_closes(closes: &[f64]) -> ReturnSeries {
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        })
        .collect();
    ReturnSeries::from_bars("TEST", Interval::OneDay, DataSource::Live, bars).unwrap()
}

#[test]
fn test_paths_start_at_investment_and_stay_positive() {
    let p = params(200, 2.0, 0.0004, 0.03);
    let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();

    assert_eq!(m.trading_days(), 504);
    assert!(m.row(0).iter().all(|&v| v == 10_000.0));
    assert!(m.as_slice().iter().all(|&v| v > 0.0));
}

#[test]
fn test_example_scenario_mean_roi() {
    let mu = 0.0003;
    let p = params(1_000, 5.0, mu, 0.015);
    assert_eq!(p.trading_days(), 1260);

    let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
    let r = summarize_paths(&m, 10_000.0, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();

    // exp(mu * t) at the final step, t = 1259 daily increments after day 0.
    let expected = ((mu * 1259.0).exp() - 1.0) * 100.0;
    assert!(
        (r.mean_roi - expected).abs() < 10.0,
        "mean_roi {} vs expected {}",
        r.mean_roi,
        expected
    );
}

#[test]
fn test_percentiles_are_monotone() {
    let p = params(500, 1.0, 0.0002, 0.02);
    let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    let r = summarize_paths(&m, 10_000.0, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    let q = r.percentiles;

    assert!(q.p5 <= q.p25 && q.p25 <= q.p50 && q.p50 <= q.p75 && q.p75 <= q.p95);
    assert!(r.min <= q.p5 && q.p95 <= r.max);
    assert!((0.0..=100.0).contains(&r.probability_of_profit));
    assert!(r.avg_max_drawdown <= 0.0 && r.avg_max_drawdown >= -1.0);
}

#[test]
fn test_certain_profit_with_strong_drift() {
    let p = params(300, 1.0, 0.01, 1e-9);
    let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
    let r = summarize_paths(&m, 10_000.0, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
    assert_eq!(r.probability_of_profit, 100.0);
}

#[test]
fn test_single_path_round_trip() {
    let p = params(1, 1.0, 0.0003, 0.02);
    let m = simulate_paths(&p, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
    let r = summarize_paths(&m, 10_000.0, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();

    let last = m.final_values()[0];
    assert!(r.probability_of_profit == 0.0 || r.probability_of_profit == 100.0);
    for v in [r.percentiles.p5, r.percentiles.p25, r.percentiles.p50, r.percentiles.p75, r.percentiles.p95] {
        assert_eq!(v, last);
    }
    assert_eq!(r.sample_paths.len(), 12);
}

#[test]
fn test_constant_growth_has_zero_sharpe() {
    let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.001f64.powi(i)).collect();
    let stats = summarize(&series_from_closes(&closes)).unwrap();

    assert_eq!(stats.sharpe_ratio, 0.0);
    assert!((stats.mean_daily_return - 0.001).abs() < 1e-12);
    assert_eq!(stats.max_drawdown, 0.0);
}

#[test]
fn test_parallel_simulation_is_reproducible() {
    let sim = PathSimulator::default();
    let p = params(2_000, 0.5, 0.0003, 0.015);
    let token = CancellationToken::new();

    let a = sim.simulate_parallel(&p, 77, &token).unwrap();
    let b = sim.simulate_parallel(&p, 77, &token).unwrap();
    let c = sim.simulate_parallel(&p, 78, &token).unwrap();

    assert_eq!(a, b);
    assert_ne!(a.final_values(), c.final_values());
}

#[test]
fn test_engine_report_json_shape() {
    let mut config = EngineConfig::default();
    config.provider.offline = true;
    config.provider.synthetic_seed = Some(10);
    let market = MarketDataService::new(config.provider.clone()).unwrap();
    let engine = ProjectionEngine::with_market(config, market);

    let request = ProjectionRequest {
        ticker: "BTC-USD".to_string(),
        num_simulations: 25,
        years: 1.0,
        seed: Some(10),
        ..ProjectionRequest::default()
    };
    let report = engine.run(&request).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["ticker"], "BTC-USD");
    assert_eq!(json["parameters"]["days"], 252);
    assert_eq!(json["num_simulations"], 25);

    let first = &json["statistics"]["sample_paths"][0];
    assert_eq!(first["day"], 0);
    assert_eq!(first["month"], 0);
    assert_eq!(first["path_0"], 10_000.0);
    assert!(first.get("path_9").is_some());
    assert!(first.get("path_10").is_none());
}
