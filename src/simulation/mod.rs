//! Monte Carlo projection: path simulation, summary and the end-to-end engine.

pub mod cancel;
pub mod engine;
pub mod gbm;
pub mod matrix;
pub mod summary;

pub use cancel::CancellationToken;
pub use engine::{ProjectionEngine, ProjectionParameters, ProjectionReport, ProjectionRequest};
pub use gbm::{simulate_paths, GbmStep, PathSimulator};
pub use matrix::PathMatrix;
pub use summary::{percentile, summarize_paths, summarize_paths_with};
