//! Historical market data: upstream providers, caching and synthetic fallback.

pub mod cache;
pub mod provider;
pub mod service;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CacheKey, SeriesCache};
pub use provider::{BarProvider, FetchRequest};
pub use service::MarketDataService;
pub use synthetic::{synthesize_bars, synthesize_series, TickerCategory, TickerProfile};
pub use yahoo::YahooProvider;
