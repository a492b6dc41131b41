use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::market_data::provider::PriceDataProvider;
use crate::market_data::series::{PriceBar, PriceSeries, Timeframe};

/// Composite key that identifies a unique bar series.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<Timeframe>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}

// ---------------------------------------------------------------------------
// SeriesStore -- thread-safe ring buffer per (symbol, timeframe)
// ---------------------------------------------------------------------------

/// In-memory price data provider. Keeps at most `max_bars` bars per
/// `(symbol, timeframe)` pair, dropping the oldest first.
pub struct SeriesStore {
    buffers: RwLock<HashMap<SeriesKey, VecDeque<PriceBar>>>,
    max_bars: usize,
}

impl SeriesStore {
    pub fn new(max_bars: usize) -> Self {
        Self {
            buffers: RwLock::new(HashMap::new()),
            max_bars,
        }
    }

    /// Append a bar. When it carries the same `open_time` as the last stored
    /// bar it replaces it (in-progress bar update).
    pub fn push(&self, key: SeriesKey, bar: PriceBar) {
        let mut map = self.buffers.write();
        let ring = map
            .entry(key)
            .or_insert_with(|| VecDeque::with_capacity(self.max_bars + 1));

        if let Some(last) = ring.back() {
            if last.open_time.is_some() && last.open_time == bar.open_time {
                ring.pop_back();
            }
        }
        ring.push_back(bar);
        while ring.len() > self.max_bars {
            ring.pop_front();
        }
    }

    /// Replace the whole series for a key, keeping the newest `max_bars`.
    pub fn insert_series(&self, series: PriceSeries) {
        let key = SeriesKey::new(series.symbol, series.timeframe);
        let start = series.bars.len().saturating_sub(self.max_bars);
        let ring: VecDeque<PriceBar> = series.bars[start..].iter().copied().collect();
        debug!(key = %key, bars = ring.len(), "series stored");
        self.buffers.write().insert(key, ring);
    }

    /// Return the most recent `count` bars (oldest-first order).
    pub fn get(&self, key: &SeriesKey, count: usize) -> Vec<PriceBar> {
        let map = self.buffers.read();
        match map.get(key) {
            Some(ring) => {
                let start = ring.len().saturating_sub(count);
                ring.iter().skip(start).copied().collect()
            }
            None => Vec::new(),
        }
    }

    /// Close of the most recent bar, if any.
    pub fn last_close(&self, key: &SeriesKey) -> Option<f64> {
        let map = self.buffers.read();
        map.get(key).and_then(|ring| ring.back().map(|b| b.close))
    }

    pub fn count(&self, key: &SeriesKey) -> usize {
        let map = self.buffers.read();
        map.get(key).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl PriceDataProvider for SeriesStore {
    async fn fetch(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, AnalysisError> {
        let key = SeriesKey::new(symbol, timeframe.clone());
        let bars = self.get(&key, self.max_bars);
        if bars.is_empty() {
            return Err(AnalysisError::upstream(symbol, timeframe.as_str(), "no bars stored"));
        }
        Ok(PriceSeries::new(symbol, timeframe.clone(), bars))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
