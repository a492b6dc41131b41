// =============================================================================
// Multi-Timeframe Trend Analysis
// =============================================================================
//
// Each timeframe is classified from its SMA(short)/SMA(long) stack:
//   bullish  = close > SMA(short) > SMA(long)
//   bearish  = close < SMA(short) < SMA(long)
//   neutral  = anything else, or fewer than SMA(long) bars
//
// Vote strength = min(1, |SMA(short) - SMA(long)| / SMA(long) * 20); zero for
// neutral votes. The consensus is a majority vote across timeframes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::ema::calculate_sma;
use crate::indicators::IndicatorParams;
use crate::market_data::PriceSeries;
use crate::types::Trend;

/// Classification of a single timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeVote {
    pub timeframe: String,
    pub trend: Trend,
    pub strength: f64,
    pub close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub bars: usize,
}

/// Majority vote across every analysed timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendConsensus {
    pub trend: Trend,
    pub confidence: f64,
    pub per_timeframe: BTreeMap<String, TimeframeVote>,
    /// More than one distinct trend label among the timeframes.
    pub has_divergence: bool,
}

/// Classify one timeframe from its closes.
pub fn classify_timeframe(series: &PriceSeries, params: &IndicatorParams) -> TimeframeVote {
    let closes = series.closes();
    let close = closes.last().copied().unwrap_or(0.0);
    let sma_short = calculate_sma(&closes, params.sma_short);
    let sma_long = calculate_sma(&closes, params.sma_long);

    let trend = if closes.len() < params.sma_long {
        Trend::Neutral
    } else if close > sma_short && sma_short > sma_long {
        Trend::Bullish
    } else if close < sma_short && sma_short < sma_long {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let strength = match trend {
        Trend::Neutral => 0.0,
        _ if sma_long.abs() > f64::EPSILON => ((sma_short - sma_long).abs() / sma_long * 20.0).min(1.0),
        _ => 0.0,
    };

    debug!(
        symbol = %series.symbol,
        timeframe = %series.timeframe,
        bars = closes.len(),
        %trend,
        strength = format!("{:.3}", strength),
        "timeframe classified"
    );

    TimeframeVote {
        timeframe: series.timeframe.to_string(),
        trend,
        strength,
        close,
        sma_short,
        sma_long,
        bars: closes.len(),
    }
}

/// Combine per-timeframe votes into a consensus.
///
/// Ties between bullish and bearish that neutral does not outnumber resolve
/// to neutral at 0.5 confidence. The result does not depend on vote order.
pub fn aggregate(votes: Vec<TimeframeVote>) -> TrendConsensus {
    let total = votes.len();
    if total == 0 {
        return TrendConsensus::default();
    }

    let count = |t: Trend| votes.iter().filter(|v| v.trend == t).count();
    let bullish = count(Trend::Bullish);
    let bearish = count(Trend::Bearish);
    let neutral = count(Trend::Neutral);

    let (trend, confidence) = if bullish > bearish && bullish >= neutral {
        (Trend::Bullish, bullish as f64 / total as f64)
    } else if bearish > bullish && bearish >= neutral {
        (Trend::Bearish, bearish as f64 / total as f64)
    } else if bullish == bearish && bullish > 0 && bullish >= neutral {
        (Trend::Neutral, 0.5)
    } else {
        (Trend::Neutral, neutral as f64 / total as f64)
    };

    let distinct = [bullish, bearish, neutral].iter().filter(|&&c| c > 0).count();
    let per_timeframe: BTreeMap<String, TimeframeVote> =
        votes.into_iter().map(|v| (v.timeframe.clone(), v)).collect();

    debug!(
        %trend,
        confidence = format!("{:.3}", confidence),
        bullish,
        bearish,
        neutral,
        "trend consensus"
    );

    TrendConsensus {
        trend,
        confidence,
        per_timeframe,
        has_divergence: distinct > 1,
    }
}
