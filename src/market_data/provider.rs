// =============================================================================
// Price Data Provider boundary
// =============================================================================
//
// The engine never fetches data itself; it asks a provider for one
// `(symbol, timeframe)` series at a time. Provider failures are surfaced as
// `AnalysisError::UpstreamUnavailable` and are not retried here.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AnalysisError;
use crate::market_data::series::{PriceSeries, Timeframe};

#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    /// Return bars oldest-first for the requested symbol and timeframe.
    async fn fetch(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, AnalysisError>;
}

/// Reads `<dir>/<SYMBOL>_<timeframe>.json`, each file holding either a full
/// serialised `PriceSeries` or a bare array of bars.
pub struct JsonDirProvider {
    dir: PathBuf,
}

impl JsonDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str, timeframe: &Timeframe) -> PathBuf {
        self.dir.join(format!("{symbol}_{timeframe}.json"))
    }
}

#[async_trait]
impl PriceDataProvider for JsonDirProvider {
    async fn fetch(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, AnalysisError> {
        let path = self.path_for(symbol, timeframe);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AnalysisError::upstream(symbol, timeframe.as_str(), format!("{}: {e}", path.display()))
        })?;

        let series = match serde_json::from_str::<PriceSeries>(&content) {
            Ok(series) => series,
            Err(_) => {
                let bars = serde_json::from_str(&content).map_err(|e| {
                    AnalysisError::upstream(
                        symbol,
                        timeframe.as_str(),
                        format!("failed to parse {}: {e}", path.display()),
                    )
                })?;
                PriceSeries::new(symbol, timeframe.clone(), bars)
            }
        };

        debug!(symbol, timeframe = %timeframe, bars = series.len(), "series loaded from disk");
        Ok(series)
    }
}
