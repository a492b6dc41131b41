pub mod provider;
pub mod series;
pub mod store;

// Re-export the core types for convenient access (e.g. `use crate::market_data::PriceBar`).
pub use provider::{JsonDirProvider, PriceDataProvider};
pub use series::{PriceBar, PriceSeries, Timeframe};
pub use store::{SeriesKey, SeriesStore};
