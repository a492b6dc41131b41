// =============================================================================
// Analysis Report
// =============================================================================
//
// The single output of one analysis call. Everything except
// `metadata.computation_time_us` is a pure function of the inputs, so two
// reports for the same series compare equal once timing is cleared.

use serde::{Deserialize, Serialize};

use crate::alerts::Alert;
use crate::indicators::IndicatorSet;
use crate::levels::LevelSet;
use crate::market_data::PriceSeries;
use crate::signals::SignalSummary;
use crate::trend::TrendConsensus;

/// Bars needed before the length factor of the quality score saturates
/// (the longest indicator window, Ichimoku Senkou B).
pub const FULL_HISTORY_BARS: usize = 52;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last_close: f64,
    pub period_high: f64,
    pub period_low: f64,
    /// First-to-last close change in percent; 0 when the first close is 0.
    pub change_pct: f64,
    pub last_volume: f64,
}

impl PriceSummary {
    pub fn from_series(series: &PriceSeries) -> Self {
        let (first, last) = match (series.bars.first(), series.bars.last()) {
            (Some(f), Some(l)) => (f.close, *l),
            _ => {
                return Self {
                    last_close: 0.0,
                    period_high: 0.0,
                    period_low: 0.0,
                    change_pct: 0.0,
                    last_volume: 0.0,
                }
            }
        };
        let (period_high, period_low) = series
            .bars
            .iter()
            .fold((f64::MIN, f64::MAX), |(hh, ll), b| (hh.max(b.high), ll.min(b.low)));
        let change_pct = if first.abs() > f64::EPSILON {
            (last.close - first) / first * 100.0
        } else {
            0.0
        };
        Self {
            last_close: last.close,
            period_high,
            period_low,
            change_pct,
            last_volume: last.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Wall-clock time spent in the pipeline, microseconds.
    pub computation_time_us: u64,
    /// 0..1, lowered by short history, gaps and degraded indicators.
    pub data_quality: f64,
    pub bars_analyzed: usize,
    pub gaps_detected: usize,
    pub degraded_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub timeframe: String,
    pub price: PriceSummary,
    pub indicators: IndicatorSet,
    pub trend: TrendConsensus,
    pub levels: LevelSet,
    pub signals: SignalSummary,
    pub alerts: Vec<Alert>,
    pub metadata: ReportMetadata,
}

impl AnalysisReport {
    /// Copy of the report with timing cleared, for equality checks.
    pub fn without_timing(&self) -> Self {
        let mut copy = self.clone();
        copy.metadata.computation_time_us = 0;
        copy
    }
}

/// Data-quality score in [0, 1].
///
///   length   = min(bars / 52, 1)
///   gaps     = 1 - 0.5 * gaps / (bars - 1)
///   degraded = 1 - 0.4 * degraded / total_indicators
pub fn data_quality(bars: usize, gaps: usize, degraded: usize, total_indicators: usize) -> f64 {
    let length = (bars as f64 / FULL_HISTORY_BARS as f64).min(1.0);
    let intervals = bars.saturating_sub(1);
    let gap_factor = if intervals > 0 {
        1.0 - 0.5 * (gaps as f64 / intervals as f64).min(1.0)
    } else {
        1.0
    };
    let degraded_factor = if total_indicators > 0 {
        1.0 - 0.4 * (degraded as f64 / total_indicators as f64).min(1.0)
    } else {
        1.0
    };
    (length * gap_factor * degraded_factor).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceBar;

    #[test]
    fn full_clean_history_scores_one() {
        assert!((data_quality(200, 0, 0, 20) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn short_history_scales_linearly() {
        assert!((data_quality(26, 0, 0, 20) - 0.5).abs() < 1e-10);
        assert!(data_quality(1, 0, 18, 20) < data_quality(30, 0, 5, 20));
    }

    #[test]
    fn gaps_and_degradation_lower_score() {
        let clean = data_quality(100, 0, 0, 20);
        let gappy = data_quality(100, 11, 0, 20);
        let degraded = data_quality(100, 0, 10, 20);
        assert!(gappy < clean);
        assert!((degraded - 0.8).abs() < 1e-10);
        assert!((0.0..=1.0).contains(&data_quality(2, 5, 30, 20)));
    }

    #[test]
    fn price_summary() {
        let s = PriceSeries::new(
            "SOLUSDT",
            "1h",
            vec![
                PriceBar::new(11.0, 9.0, 10.0, 1.0),
                PriceBar::new(14.0, 10.0, 13.0, 2.0),
                PriceBar::new(13.0, 8.0, 12.0, 3.0),
            ],
        );
        let p = PriceSummary::from_series(&s);
        assert!((p.last_close - 12.0).abs() < 1e-10);
        assert!((p.period_high - 14.0).abs() < 1e-10);
        assert!((p.period_low - 8.0).abs() < 1e-10);
        assert!((p.change_pct - 20.0).abs() < 1e-10);
        assert!((p.last_volume - 3.0).abs() < 1e-10);
    }
}
