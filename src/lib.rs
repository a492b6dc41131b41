// =============================================================================
// Aurora Analysis — technical market analysis engine
// =============================================================================
//
// Turns OHLCV price series into a structured report: indicators,
// support/resistance levels, a multi-timeframe trend consensus, a composite
// signal score and threshold alerts.

pub mod alerts;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod signals;
pub mod sink;
pub mod trend;
pub mod types;

pub use engine::{AnalysisEngine, AnalysisInput, AnalysisParams};
pub use error::AnalysisError;
pub use report::AnalysisReport;
pub use runtime_config::EngineConfig;
