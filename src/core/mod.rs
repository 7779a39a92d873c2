//! Core types and utilities for quantasim.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, ProviderConfig, SimulationConfig};
pub use error::{QuantaError, Result};
pub use types::*;
