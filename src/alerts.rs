// =============================================================================
// Alert Generator
// =============================================================================
//
// Deterministic threshold rules, each firing at most once per evaluation:
//   RSI above the extreme-high line     -> rsi_overbought      high
//   RSI below the extreme-low line      -> rsi_oversold        high
//   close near the nearest resistance   -> resistance_test     medium
//   high-confidence external pattern    -> pattern_completed   critical
//   MACD histogram against price move   -> macd_divergence     medium
//
// Alerts keep insertion order; severity and confidence are the caller's sort
// keys.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::set::MACD;
use crate::indicators::IndicatorSet;
use crate::levels::LevelSet;
use crate::market_data::PriceSeries;
use crate::types::{Severity, Trend};

pub const RSI_OVERBOUGHT: &str = "rsi_overbought";
pub const RSI_OVERSOLD: &str = "rsi_oversold";
pub const RESISTANCE_TEST: &str = "resistance_test";
pub const PATTERN_COMPLETED: &str = "pattern_completed";
pub const MACD_DIVERGENCE: &str = "macd_divergence";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub suggested_action: String,
    pub confidence: f64,
}

/// A chart pattern reported by an external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: String,
    pub confidence: f64,
    pub direction: Trend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_target: Option<f64>,
}

/// Recognises chart patterns in a series. Implementations must be
/// deterministic for a given input.
pub trait PatternDetector: Send + Sync {
    fn detect(&self, series: &PriceSeries) -> Vec<DetectedPattern>;
}

/// Call-time alert thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub rsi_extreme_high: f64,
    pub rsi_extreme_low: f64,
    /// Max distance from the nearest resistance, in percent of the close.
    pub resistance_proximity_pct: f64,
    /// A pattern must exceed this confidence to alert.
    pub pattern_confidence: f64,
    /// Bars over which price direction is compared with the MACD histogram.
    pub divergence_lookback: usize,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            rsi_extreme_high: 80.0,
            rsi_extreme_low: 20.0,
            resistance_proximity_pct: 2.0,
            pattern_confidence: 0.9,
            divergence_lookback: 10,
        }
    }
}

fn alert(kind: &str, severity: Severity, message: String, action: &str, confidence: f64) -> Alert {
    Alert {
        kind: kind.to_string(),
        severity,
        message,
        suggested_action: action.to_string(),
        confidence,
    }
}

/// Evaluate every alert rule against one analysed series.
pub fn generate_alerts(
    series: &PriceSeries,
    indicators: &IndicatorSet,
    levels: Option<&LevelSet>,
    patterns: &[DetectedPattern],
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let Some(last) = series.last() else {
        return alerts;
    };
    let close = last.close;

    // --- RSI extremes ------------------------------------------------------
    let rsi = indicators.rsi();
    if rsi > thresholds.rsi_extreme_high {
        alerts.push(alert(
            RSI_OVERBOUGHT,
            Severity::High,
            format!("{} RSI at {:.1} is extremely overbought", series.symbol, rsi),
            "consider_sell",
            0.75,
        ));
    } else if rsi < thresholds.rsi_extreme_low {
        alerts.push(alert(
            RSI_OVERSOLD,
            Severity::High,
            format!("{} RSI at {:.1} is extremely oversold", series.symbol, rsi),
            "consider_buy",
            0.75,
        ));
    }

    // --- Resistance proximity ---------------------------------------------
    if let Some(level) = levels.and_then(|l| l.nearest_resistance(close)) {
        if close > 0.0 {
            let distance_pct = (level.price - close).abs() / close * 100.0;
            if distance_pct <= thresholds.resistance_proximity_pct {
                alerts.push(alert(
                    RESISTANCE_TEST,
                    Severity::Medium,
                    format!(
                        "{} at {:.4} is testing {} resistance {} at {:.4} ({:.2}% away)",
                        series.symbol, close, level.origin, level.label, level.price, distance_pct
                    ),
                    "watch_breakout",
                    level.strength,
                ));
            }
        }
    }

    // --- External patterns -------------------------------------------------
    let strongest = patterns
        .iter()
        .filter(|p| p.confidence > thresholds.pattern_confidence)
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
    if let Some(pattern) = strongest {
        let action = match pattern.direction {
            Trend::Bullish => "consider_buy",
            Trend::Bearish => "consider_sell",
            Trend::Neutral => "review_position",
        };
        let target = pattern
            .price_target
            .map(|t| format!(", target {:.4}", t))
            .unwrap_or_default();
        alerts.push(alert(
            PATTERN_COMPLETED,
            Severity::Critical,
            format!(
                "{} completed {} pattern ({}){}",
                series.symbol, pattern.pattern, pattern.direction, target
            ),
            action,
            pattern.confidence.clamp(0.0, 1.0),
        ));
    }

    // --- MACD divergence ---------------------------------------------------
    let lookback = thresholds.divergence_lookback;
    if !indicators.is_degraded(MACD) && lookback > 0 && series.len() > lookback {
        let histogram = indicators.macd().histogram;
        let base = series.bars[series.len() - 1 - lookback].close;
        let price_change = close - base;
        let diverging = (price_change > 0.0 && histogram < 0.0) || (price_change < 0.0 && histogram > 0.0);
        if diverging {
            let (price_dir, hist_dir) = if price_change > 0.0 {
                ("rose", "negative")
            } else {
                ("fell", "positive")
            };
            alerts.push(alert(
                MACD_DIVERGENCE,
                Severity::Medium,
                format!(
                    "{} price {} over {} bars while MACD histogram is {} ({:.4})",
                    series.symbol, price_dir, lookback, hist_dir, histogram
                ),
                "review_position",
                0.65,
            ));
        }
    }

    if !alerts.is_empty() {
        debug!(
            symbol = %series.symbol,
            count = alerts.len(),
            kinds = ?alerts.iter().map(|a| a.kind.as_str()).collect::<Vec<_>>(),
            "alerts generated"
        );
    }

    alerts
}
