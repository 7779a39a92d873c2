use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use quantasim::core::types::Interval;
use quantasim::{EngineConfig, ProjectionEngine, ProjectionRequest, QuantaError};

#[derive(Parser)]
#[command(name = "quantasim")]
#[command(about = "Monte Carlo price projection for a single ticker", long_about = None)]
struct Cli {
    /// Ticker symbol (e.g., "SPY", "AAPL", "BTC-USD")
    ticker: String,
    /// Amount invested at day 0
    #[arg(long, default_value_t = 10_000.0)]
    investment: f64,
    /// Number of simulated paths
    #[arg(long, default_value_t = 1_000)]
    simulations: usize,
    /// Projection horizon in years
    #[arg(long, default_value_t = 5.0)]
    years: f64,
    /// Bar interval of the historical data (1h, 1d, 1wk, 1mo)
    #[arg(long, default_value = "1d")]
    interval: Interval,
    /// Seed for reproducible runs
    #[arg(long, env = "QUANTASIM_SEED")]
    seed: Option<u64>,
    /// Never contact the upstream provider; use synthetic data
    #[arg(long)]
    offline: bool,
    /// JSON engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn load_config(cli: &Cli) -> Result<EngineConfig, QuantaError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                QuantaError::invalid_parameter(format!("cannot read {}: {}", path.display(), e))
            })?;
            EngineConfig::from_json(&text)?
        }
        None => EngineConfig::default(),
    };
    if cli.offline {
        config.provider.offline = true;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
        config.provider.synthetic_seed = cli.seed;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<String, QuantaError> {
    let engine = ProjectionEngine::new(load_config(cli)?)?;
    let request = ProjectionRequest {
        ticker: cli.ticker.clone(),
        initial_investment: cli.investment,
        num_simulations: cli.simulations,
        years: cli.years,
        interval: cli.interval,
        seed: cli.seed,
    };
    let report = engine.run(&request)?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    json.map_err(|e| QuantaError::parse(e.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "projection failed");
            ExitCode::FAILURE
        }
    }
}
