//! Performance metrics for quantasim.

pub mod drawdown;
pub mod stats;
pub mod streaming;

pub use drawdown::{drawdown_curve, max_drawdown, DrawdownTracker};
pub use stats::summarize;
pub use streaming::RunningStats;
