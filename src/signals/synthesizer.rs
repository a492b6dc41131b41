// =============================================================================
// Signal Synthesizer — composite score from indicators and trend
// =============================================================================
//
// The score starts neutral at 0.5 and each rule nudges it, clamping to
// [0, 1] after every step:
//   RSI < oversold      +0.3        RSI > overbought    -0.3
//   MACD bullish        +0.2        MACD bearish        -0.2
//   trend bullish       +0.2 * conf trend bearish       -0.2 * conf

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::IndicatorSet;
use crate::trend::TrendConsensus;
use crate::types::{SignalDirection, Trend};

const RSI_WEIGHT: f64 = 0.3;
const MACD_WEIGHT: f64 = 0.2;
const TREND_WEIGHT: f64 = 0.2;
const NEUTRAL_SCORE: f64 = 0.5;

pub const RSI_OVERSOLD: &str = "rsi_oversold";
pub const RSI_OVERBOUGHT: &str = "rsi_overbought";
pub const MACD_BULLISH_CROSSOVER: &str = "macd_bullish_crossover";
pub const MACD_BEARISH_CROSSOVER: &str = "macd_bearish_crossover";

/// Call-time thresholds for the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Distance from 0.5 the score must reach to recommend buy or sell.
    pub recommendation_threshold: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            recommendation_threshold: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: String,
    pub direction: SignalDirection,
    pub strength: f64,
}

impl Signal {
    fn new(kind: &str, direction: SignalDirection, strength: f64) -> Self {
        Self {
            kind: kind.to_string(),
            direction,
            strength,
        }
    }
}

/// The contribution of a single rule to the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    pub weight: f64,
    pub confidence: f64,
    /// +1.0 for bullish, -1.0 for bearish.
    pub direction: f64,
    /// Score change actually applied after clamping.
    pub contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Hold => write!(f, "hold"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Output of the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub score: f64,
    pub recommendation: Recommendation,
    pub signals: Vec<Signal>,
    pub contributions: Vec<SignalContribution>,
}

impl SignalSummary {
    pub fn buy_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.direction == SignalDirection::Buy)
    }

    pub fn sell_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.direction == SignalDirection::Sell)
    }
}

struct ScoreBuilder {
    score: f64,
    contributions: Vec<SignalContribution>,
}

impl ScoreBuilder {
    fn apply(&mut self, name: &str, weight: f64, confidence: f64, direction: f64) {
        let before = self.score;
        self.score = (self.score + weight * confidence * direction).clamp(0.0, 1.0);
        self.contributions.push(SignalContribution {
            name: name.to_string(),
            weight,
            confidence,
            direction,
            contribution: self.score - before,
        });
    }
}

/// Build the composite score, signal list and recommendation.
pub fn synthesize(indicators: &IndicatorSet, trend: &TrendConsensus, thresholds: &SignalThresholds) -> SignalSummary {
    let mut builder = ScoreBuilder {
        score: NEUTRAL_SCORE,
        contributions: Vec::new(),
    };
    let mut signals = Vec::new();

    let rsi = indicators.rsi();
    if rsi < thresholds.rsi_oversold {
        builder.apply("rsi", RSI_WEIGHT, 1.0, 1.0);
        signals.push(Signal::new(RSI_OVERSOLD, SignalDirection::Buy, 0.7));
    } else if rsi > thresholds.rsi_overbought {
        builder.apply("rsi", RSI_WEIGHT, 1.0, -1.0);
        signals.push(Signal::new(RSI_OVERBOUGHT, SignalDirection::Sell, 0.7));
    }

    let macd = indicators.macd();
    if macd.is_bullish() {
        builder.apply("macd", MACD_WEIGHT, 1.0, 1.0);
        signals.push(Signal::new(MACD_BULLISH_CROSSOVER, SignalDirection::Buy, 0.8));
    } else if macd.is_bearish() {
        builder.apply("macd", MACD_WEIGHT, 1.0, -1.0);
        signals.push(Signal::new(MACD_BEARISH_CROSSOVER, SignalDirection::Sell, 0.8));
    }

    match trend.trend {
        Trend::Bullish => builder.apply("trend", TREND_WEIGHT, trend.confidence, 1.0),
        Trend::Bearish => builder.apply("trend", TREND_WEIGHT, trend.confidence, -1.0),
        Trend::Neutral => {}
    }

    let score = builder.score;
    let recommendation = if score >= NEUTRAL_SCORE + thresholds.recommendation_threshold {
        Recommendation::Buy
    } else if score <= NEUTRAL_SCORE - thresholds.recommendation_threshold {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    };

    debug!(
        score = format!("{:.3}", score),
        %recommendation,
        signals = signals.len(),
        "signals synthesized"
    );

    SignalSummary {
        score,
        recommendation,
        signals,
        contributions: builder.contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::macd::MacdResult;
    use crate::indicators::set::{MACD, RSI};
    use crate::indicators::IndicatorValue;

    fn indicators(rsi: f64, macd: MacdResult) -> IndicatorSet {
        let mut set = IndicatorSet::default();
        set.momentum.insert(RSI.to_string(), IndicatorValue::scalar(rsi));
        set.trend.insert(MACD.to_string(), macd.into());
        set
    }

    fn consensus(trend: Trend, confidence: f64) -> TrendConsensus {
        TrendConsensus {
            trend,
            confidence,
            ..Default::default()
        }
    }

    const BULL_MACD: MacdResult = MacdResult {
        macd_line: 1.0,
        signal_line: 0.5,
        histogram: 0.5,
    };
    const BEAR_MACD: MacdResult = MacdResult {
        macd_line: -1.0,
        signal_line: -0.5,
        histogram: -0.5,
    };

    #[test]
    fn neutral_inputs_hold_at_half() {
        let s = synthesize(
            &indicators(50.0, MacdResult::default()),
            &consensus(Trend::Neutral, 0.0),
            &SignalThresholds::default(),
        );
        assert!((s.score - 0.5).abs() < 1e-10);
        assert_eq!(s.recommendation, Recommendation::Hold);
        assert!(s.signals.is_empty());
        assert!(s.contributions.is_empty());
    }

    #[test]
    fn everything_bullish_clamps_to_one() {
        let s = synthesize(
            &indicators(25.0, BULL_MACD),
            &consensus(Trend::Bullish, 1.0),
            &SignalThresholds::default(),
        );
        assert!((s.score - 1.0).abs() < 1e-10);
        assert_eq!(s.recommendation, Recommendation::Buy);
        let kinds: Vec<_> = s.buy_signals().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, [RSI_OVERSOLD, MACD_BULLISH_CROSSOVER]);
        // 0.5 + 0.3 + 0.2 already hits the ceiling.
        assert_eq!(s.contributions.len(), 3);
        assert!(s.contributions[2].contribution.abs() < 1e-10);
    }

    #[test]
    fn bearish_stack_recommends_sell() {
        let s = synthesize(
            &indicators(75.0, BEAR_MACD),
            &consensus(Trend::Bearish, 0.5),
            &SignalThresholds::default(),
        );
        // 0.5 - 0.3 - 0.2 = 0.0, trend cannot go lower.
        assert!(s.score.abs() < 1e-10);
        assert_eq!(s.recommendation, Recommendation::Sell);
        assert_eq!(s.sell_signals().count(), 2);
        let strengths: Vec<f64> = s.signals.iter().map(|s| s.strength).collect();
        assert_eq!(strengths, [0.7, 0.8]);
    }

    #[test]
    fn trend_scales_with_confidence() {
        let s = synthesize(
            &indicators(50.0, MacdResult::default()),
            &consensus(Trend::Bullish, 0.5),
            &SignalThresholds::default(),
        );
        assert!((s.score - 0.6).abs() < 1e-10);
        assert_eq!(s.recommendation, Recommendation::Hold);
    }

    #[test]
    fn thresholds_are_call_time() {
        let tight = SignalThresholds {
            rsi_oversold: 55.0,
            ..Default::default()
        };
        let s = synthesize(&indicators(50.0, MacdResult::default()), &consensus(Trend::Neutral, 0.0), &tight);
        assert_eq!(s.signals.len(), 1);
        assert_eq!(s.signals[0].kind, RSI_OVERSOLD);
        assert_eq!(s.recommendation, Recommendation::Buy);

        let default = synthesize(
            &indicators(50.0, MacdResult::default()),
            &consensus(Trend::Neutral, 0.0),
            &SignalThresholds::default(),
        );
        assert!(default.signals.is_empty());
    }
}
