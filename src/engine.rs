// =============================================================================
// Analysis Engine — per-symbol orchestration
// =============================================================================
//
// Sequences one analysis:
//   validate -> levels -> indicators -> trend vote -> signals -> alerts
// then stamps timing and data quality, caches the report per symbol
// (last write wins) and hands it to the optional sink.
//
// The pipeline itself is synchronous and pure. `analyze_symbol` adds the
// async edge: concurrent timeframe fetches from a provider, bounded by the
// configured deadline.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::try_join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::alerts::{generate_alerts, AlertThresholds, DetectedPattern, PatternDetector};
use crate::error::AnalysisError;
use crate::indicators::{IndicatorParams, IndicatorSet};
use crate::levels::{detect_levels, LevelParams};
use crate::market_data::{PriceDataProvider, PriceSeries, Timeframe};
use crate::report::{data_quality, AnalysisReport, PriceSummary, ReportMetadata};
use crate::runtime_config::EngineConfig;
use crate::signals::{synthesize, SignalThresholds};
use crate::sink::ReportSink;
use crate::trend::{aggregate, classify_timeframe};

/// Every tunable used by one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub indicators: IndicatorParams,
    pub levels: LevelParams,
    pub signals: SignalThresholds,
    pub alerts: AlertThresholds,
}

/// Inputs for one analysis beyond the primary series.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    /// Drives indicators, levels, signals and alerts.
    pub series: PriceSeries,
    /// Additional timeframes for the trend vote.
    pub timeframes: Vec<PriceSeries>,
    /// Patterns from an external detector.
    pub patterns: Vec<DetectedPattern>,
}

impl AnalysisInput {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            timeframes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    pub fn with_timeframes(mut self, timeframes: Vec<PriceSeries>) -> Self {
        self.timeframes = timeframes;
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<DetectedPattern>) -> Self {
        self.patterns = patterns;
        self
    }
}

pub struct AnalysisEngine {
    config: EngineConfig,
    cache: RwLock<HashMap<String, AnalysisReport>>,
    sink: Option<Arc<dyn ReportSink>>,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Synchronous pipeline
    // -------------------------------------------------------------------------

    /// Analyse a single series with the configured parameters.
    pub fn analyze(&self, symbol: &str, series: PriceSeries) -> Result<AnalysisReport, AnalysisError> {
        let params = self.config.params();
        self.analyze_with(symbol, AnalysisInput::new(series), &params)
    }

    /// Analyse with extra timeframes, external patterns and call-time
    /// parameter overrides.
    ///
    /// Fails only on invalid input; short history lowers the data-quality
    /// score instead.
    pub fn analyze_with(
        &self,
        symbol: &str,
        input: AnalysisInput,
        params: &AnalysisParams,
    ) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();

        if symbol.trim().is_empty() {
            return Err(AnalysisError::invalid(symbol, "symbol is empty"));
        }
        input.series.validate()?;
        for extra in &input.timeframes {
            extra.validate()?;
        }

        let series = &input.series;
        let bars = &series.bars;

        let levels = detect_levels(bars, &params.levels)
            .ok_or_else(|| AnalysisError::invalid(symbol, "series has no bars"))?;
        let indicators = IndicatorSet::compute(bars, &params.indicators);

        // One vote per distinct timeframe; the primary series wins duplicates.
        let mut seen = BTreeSet::new();
        let votes = std::iter::once(series)
            .chain(input.timeframes.iter())
            .filter(|s| seen.insert(s.timeframe.clone()))
            .map(|s| classify_timeframe(s, &params.indicators))
            .collect();
        let trend = aggregate(votes);

        let signals = synthesize(&indicators, &trend, &params.signals);
        let alerts = generate_alerts(series, &indicators, Some(&levels), &input.patterns, &params.alerts);

        let gaps = series.count_gaps();
        let quality = data_quality(bars.len(), gaps, indicators.degraded.len(), indicators.len());
        let degraded_indicators = indicators.degraded.clone();

        let mut report = AnalysisReport {
            symbol: symbol.to_string(),
            timeframe: series.timeframe.to_string(),
            price: PriceSummary::from_series(series),
            indicators,
            trend,
            levels,
            signals,
            alerts,
            metadata: ReportMetadata {
                computation_time_us: 0,
                data_quality: quality,
                bars_analyzed: bars.len(),
                gaps_detected: gaps,
                degraded_indicators,
            },
        };
        report.metadata.computation_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        info!(
            symbol,
            timeframe = %report.timeframe,
            trend = %report.trend.trend,
            score = format!("{:.3}", report.signals.score),
            recommendation = %report.signals.recommendation,
            alerts = report.alerts.len(),
            quality = format!("{:.3}", quality),
            elapsed_us = report.metadata.computation_time_us,
            "analysis complete"
        );

        if self.config.cache_enabled {
            self.cache.write().insert(symbol.to_string(), report.clone());
        }
        if let Some(sink) = &self.sink {
            sink.publish(&report);
        }

        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Provider-backed analysis
    // -------------------------------------------------------------------------

    /// Fetch every configured timeframe concurrently and analyse the symbol,
    /// giving up after `analysis_timeout_ms`.
    pub async fn analyze_symbol(
        &self,
        provider: &dyn PriceDataProvider,
        symbol: &str,
        detector: Option<&dyn PatternDetector>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let timeout_ms = self.config.analysis_timeout_ms;
        let work = self.fetch_and_analyze(provider, symbol, detector);
        match tokio::time::timeout(Duration::from_millis(timeout_ms), work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(symbol, timeout_ms, "analysis timed out");
                Err(AnalysisError::Timeout {
                    symbol: symbol.to_string(),
                    timeout_ms,
                })
            }
        }
    }

    async fn fetch_and_analyze(
        &self,
        provider: &dyn PriceDataProvider,
        symbol: &str,
        detector: Option<&dyn PatternDetector>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let timeframes: Vec<Timeframe> = self
            .config
            .fetch_timeframes()
            .into_iter()
            .map(Timeframe::new)
            .collect();

        let fetches = timeframes.iter().map(|tf| provider.fetch(symbol, tf));
        let mut fetched = match try_join_all(fetches).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, error = %e, "price fetch failed");
                return Err(e);
            }
        };
        debug!(symbol, timeframes = fetched.len(), "timeframes fetched");

        let primary_idx = timeframes
            .iter()
            .position(|tf| tf.as_str() == self.config.primary_timeframe)
            .ok_or_else(|| {
                AnalysisError::upstream(symbol, &self.config.primary_timeframe, "primary timeframe not fetched")
            })?;
        let primary = fetched.remove(primary_idx);

        let patterns = detector.map(|d| d.detect(&primary)).unwrap_or_default();
        let input = AnalysisInput::new(primary)
            .with_timeframes(fetched)
            .with_patterns(patterns);

        self.analyze_with(symbol, input, &self.config.params())
    }

    // -------------------------------------------------------------------------
    // Report cache
    // -------------------------------------------------------------------------

    pub fn last_report(&self, symbol: &str) -> Option<AnalysisReport> {
        self.cache.read().get(symbol).cloned()
    }

    /// Cached symbols, sorted.
    pub fn cached_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.cache.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::set::{ADX, OBV, RSI, STOCHASTIC, WILLIAMS_R};
    use crate::indicators::IndicatorValue;
    use crate::market_data::{PriceBar, SeriesKey, SeriesStore};
    use crate::sink::BroadcastSink;
    use crate::types::Trend;
    use async_trait::async_trait;

    fn rising(symbol: &str, tf: &str, n: usize) -> PriceSeries {
        let bars = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                PriceBar::new(c + 0.5, c - 0.5, c, 1000.0)
            })
            .collect();
        PriceSeries::new(symbol, tf, bars)
    }

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(EngineConfig::default())
    }

    #[test]
    fn thirty_bar_rising_scenario() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let c = 90.0 + 30.0 * i as f64 / 29.0;
                PriceBar::new(c + 0.5, c - 0.5, c, 1000.0)
            })
            .collect();
        let series = PriceSeries::new("BTCUSDT", "1h", bars.clone());
        let report = engine().analyze("BTCUSDT", series).unwrap();

        assert!((report.indicators.rsi() - 100.0).abs() < 1e-10);
        let obv = crate::indicators::volume::obv_series(&bars);
        assert!(obv.windows(2).all(|w| w[1] > w[0]));
        assert!(report.indicators.scalar(OBV).unwrap() > 0.0);
        assert!(report.indicators.macd().is_bullish());
        // Fewer bars than SMA(50) needs.
        assert_eq!(report.trend.trend, Trend::Neutral);
    }

    #[test]
    fn sixty_bar_rising_is_bullish() {
        let report = engine().analyze("BTCUSDT", rising("BTCUSDT", "1h", 60)).unwrap();
        assert_eq!(report.trend.trend, Trend::Bullish);
        assert!((report.trend.confidence - 1.0).abs() < 1e-10);
        assert!(!report.trend.has_divergence);
        assert!((0.0..=1.0).contains(&report.signals.score));
    }

    #[test]
    fn single_bar_degrades_without_error() {
        let series = PriceSeries::new("BTCUSDT", "1h", vec![PriceBar::new(10.0, 9.0, 9.5, 100.0)]);
        let report = engine().analyze("BTCUSDT", series).unwrap();

        assert!((report.indicators.rsi() - 50.0).abs() < 1e-10);
        assert_eq!(
            report.indicators.get(STOCHASTIC),
            Some(&IndicatorValue::OscillatorPair { k: 50.0, d: 50.0 })
        );
        assert!((report.indicators.scalar(WILLIAMS_R).unwrap() + 50.0).abs() < 1e-10);
        assert_eq!(report.indicators.scalar(ADX), Some(0.0));
        assert!(report.metadata.data_quality < 0.1);
        assert!(report.metadata.degraded_indicators.iter().any(|n| n == RSI));
        assert_eq!(report.metadata.bars_analyzed, 1);
    }

    #[test]
    fn analyze_is_idempotent() {
        let series = rising("ETHUSDT", "1h", 120);
        let e = engine();
        let a = e.analyze("ETHUSDT", series.clone()).unwrap();
        let b = e.analyze("ETHUSDT", series).unwrap();
        assert_eq!(a.without_timing(), b.without_timing());
        let ja = serde_json::to_string(&a.without_timing()).unwrap();
        let jb = serde_json::to_string(&b.without_timing()).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn invalid_input_rejected() {
        let e = engine();
        let empty = PriceSeries::new("BTCUSDT", "1h", Vec::new());
        assert!(matches!(e.analyze("BTCUSDT", empty), Err(AnalysisError::InvalidInput { .. })));

        let nan = PriceSeries::new("BTCUSDT", "1h", vec![PriceBar::new(f64::NAN, 1.0, 1.0, 1.0)]);
        assert!(matches!(e.analyze("BTCUSDT", nan), Err(AnalysisError::InvalidInput { .. })));

        assert!(matches!(
            e.analyze("  ", rising("BTCUSDT", "1h", 5)),
            Err(AnalysisError::InvalidInput { .. })
        ));
        assert!(e.cached_symbols().is_empty());
    }

    #[test]
    fn out_of_range_timeframe_label_is_ignored_for_gaps() {
        let mut series = rising("BTCUSDT", "99999999999999999s", 30);
        series.bars[0].open_time = Some(i64::MIN);
        series.bars[1].open_time = Some(i64::MAX);
        let report = engine().analyze("BTCUSDT", series).unwrap();
        assert_eq!(report.metadata.gaps_detected, 0);
        assert_eq!(report.metadata.bars_analyzed, 30);
    }

    #[test]
    fn extra_timeframes_vote() {
        let e = engine();
        let input = AnalysisInput::new(rising("SOLUSDT", "1h", 60)).with_timeframes(vec![
            rising("SOLUSDT", "4h", 60),
            rising("SOLUSDT", "15m", 20),
            rising("SOLUSDT", "1h", 10),
        ]);
        let report = e.analyze_with("SOLUSDT", input, &AnalysisParams::default()).unwrap();
        assert_eq!(report.trend.per_timeframe.len(), 3);
        assert_eq!(report.trend.per_timeframe["1h"].bars, 60);
        assert_eq!(report.trend.trend, Trend::Bullish);
        assert!((report.trend.confidence - 2.0 / 3.0).abs() < 1e-10);
        assert!(report.trend.has_divergence);
    }

    #[test]
    fn call_time_params_override_config() {
        let e = engine();
        let series = rising("XRPUSDT", "1h", 40);
        let mut params = AnalysisParams::default();
        params.alerts.rsi_extreme_high = 101.0;
        let quiet = e.analyze_with("XRPUSDT", AnalysisInput::new(series.clone()), &params).unwrap();
        assert!(quiet.alerts.iter().all(|a| a.kind != crate::alerts::RSI_OVERBOUGHT));

        let loud = e.analyze("XRPUSDT", series).unwrap();
        assert!(loud.alerts.iter().any(|a| a.kind == crate::alerts::RSI_OVERBOUGHT));
    }

    #[test]
    fn patterns_raise_alerts() {
        let input = AnalysisInput::new(rising("BNBUSDT", "1h", 30)).with_patterns(vec![DetectedPattern {
            pattern: "cup_and_handle".to_string(),
            confidence: 0.93,
            direction: Trend::Bullish,
            price_target: Some(150.0),
        }]);
        let report = engine()
            .analyze_with("BNBUSDT", input, &AnalysisParams::default())
            .unwrap();
        let alert = report
            .alerts
            .iter()
            .find(|a| a.kind == crate::alerts::PATTERN_COMPLETED)
            .unwrap();
        assert_eq!(alert.suggested_action, "consider_buy");
    }

    #[test]
    fn cache_is_last_write_wins() {
        let e = engine();
        e.analyze("BTCUSDT", rising("BTCUSDT", "1h", 20)).unwrap();
        e.analyze("ETHUSDT", rising("ETHUSDT", "1h", 20)).unwrap();
        e.analyze("BTCUSDT", rising("BTCUSDT", "1h", 70)).unwrap();

        assert_eq!(e.cached_symbols(), vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(e.last_report("BTCUSDT").unwrap().metadata.bars_analyzed, 70);
        e.clear_cache();
        assert!(e.last_report("BTCUSDT").is_none());
    }

    #[test]
    fn cache_can_be_disabled() {
        let config = EngineConfig {
            cache_enabled: false,
            ..EngineConfig::default()
        };
        let e = AnalysisEngine::new(config);
        e.analyze("BTCUSDT", rising("BTCUSDT", "1h", 20)).unwrap();
        assert!(e.last_report("BTCUSDT").is_none());
    }

    #[tokio::test]
    async fn broadcast_sink_receives_reports() {
        let sink = Arc::new(BroadcastSink::new(8));
        let mut rx = sink.subscribe();
        let e = engine().with_sink(sink.clone());
        e.analyze("ADAUSDT", rising("ADAUSDT", "1h", 25)).unwrap();
        let published = rx.recv().await.unwrap();
        assert_eq!(published.symbol, "ADAUSDT");
        assert_eq!(sink.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn analyze_symbol_fetches_all_timeframes() {
        let store = SeriesStore::new(500);
        for tf in ["15m", "1h", "4h"] {
            store.insert_series(rising("BTCUSDT", tf, 80));
        }
        let e = engine();
        let report = e.analyze_symbol(&store, "BTCUSDT", None).await.unwrap();
        assert_eq!(report.timeframe, "1h");
        assert_eq!(report.trend.per_timeframe.len(), 3);
        assert_eq!(report.trend.trend, Trend::Bullish);
        assert!(e.last_report("BTCUSDT").is_some());
    }

    #[tokio::test]
    async fn missing_timeframe_is_upstream_error() {
        let store = SeriesStore::new(500);
        store.insert_series(rising("BTCUSDT", "1h", 80));
        let err = engine().analyze_symbol(&store, "BTCUSDT", None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::UpstreamUnavailable { .. }));
        assert_eq!(store.count(&SeriesKey::new("BTCUSDT", "1h")), 80);
    }

    struct SlowProvider;

    #[async_trait]
    impl PriceDataProvider for SlowProvider {
        async fn fetch(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, AnalysisError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(rising(symbol, timeframe.as_str(), 60))
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let config = EngineConfig {
            analysis_timeout_ms: 20,
            ..EngineConfig::default()
        };
        let err = AnalysisEngine::new(config)
            .analyze_symbol(&SlowProvider, "ETHUSDT", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout { timeout_ms: 20, .. }));
    }

    struct FixedDetector;

    impl PatternDetector for FixedDetector {
        fn detect(&self, series: &PriceSeries) -> Vec<DetectedPattern> {
            vec![DetectedPattern {
                pattern: format!("double_top_{}", series.timeframe),
                confidence: 0.97,
                direction: Trend::Bearish,
                price_target: None,
            }]
        }
    }

    #[tokio::test]
    async fn detector_sees_primary_series() {
        let store = SeriesStore::new(500);
        for tf in ["15m", "1h", "4h"] {
            store.insert_series(rising("ETHUSDT", tf, 60));
        }
        let report = engine()
            .analyze_symbol(&store, "ETHUSDT", Some(&FixedDetector))
            .await
            .unwrap();
        let alert = report
            .alerts
            .iter()
            .find(|a| a.kind == crate::alerts::PATTERN_COMPLETED)
            .unwrap();
        assert!(alert.message.contains("double_top_1h"));
        assert_eq!(alert.suggested_action, "consider_sell");
    }
}
