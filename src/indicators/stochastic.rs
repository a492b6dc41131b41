// =============================================================================
// Stochastic Oscillator & Williams %R
// =============================================================================
//
//   %K = (close - lowest_low) / (highest_high - lowest_low) * 100
//   %D = SMA(d_period) of the %K series
//   %R = (highest_high - close) / (highest_high - lowest_low) * -100
//
// Both are computed over a `k_period` / `period` high-low window. A window
// with no range (highest == lowest) reads as the mid-point.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::calculate_sma;
use crate::market_data::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticResult {
    pub k: f64,
    pub d: f64,
}

impl StochasticResult {
    pub const NEUTRAL: Self = Self { k: 50.0, d: 50.0 };
}

/// Highest high and lowest low of a window.
fn high_low(window: &[PriceBar]) -> (f64, f64) {
    window.iter().fold((f64::MIN, f64::MAX), |(hh, ll), b| {
        (hh.max(b.high), ll.min(b.low))
    })
}

/// Position of `close` within `[low, high]` scaled to [0, 100]. Closes
/// outside the bar range are clamped.
fn percent_k(close: f64, highest: f64, lowest: f64) -> f64 {
    let range = highest - lowest;
    if range <= 0.0 {
        return 50.0;
    }
    ((close - lowest) / range * 100.0).clamp(0.0, 100.0)
}

/// %K series; element `i` belongs to bar index `k_period - 1 + i`.
pub fn percent_k_series(bars: &[PriceBar], k_period: usize) -> Vec<f64> {
    if k_period == 0 || bars.len() < k_period {
        return Vec::new();
    }
    bars.windows(k_period)
        .map(|w| {
            let (hh, ll) = high_low(w);
            percent_k(w[w.len() - 1].close, hh, ll)
        })
        .collect()
}

/// Latest stochastic reading. Returns `{50, 50}` with fewer than `k_period`
/// bars; while the %K history is shorter than `d_period`, %D averages what
/// is available.
pub fn calculate_stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> StochasticResult {
    let k_series = percent_k_series(bars, k_period);
    let Some(&k) = k_series.last() else {
        return StochasticResult::NEUTRAL;
    };
    let d = if k_series.len() >= d_period {
        calculate_sma(&k_series, d_period)
    } else {
        k_series.iter().sum::<f64>() / k_series.len() as f64
    };
    StochasticResult { k, d }
}

/// Williams %R in [-100, 0]. Returns -50 with fewer than `period` bars or a
/// window without range.
pub fn calculate_williams_r(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period {
        return -50.0;
    }
    let window = &bars[bars.len() - period..];
    let (hh, ll) = high_low(window);
    let close = window[window.len() - 1].close;
    percent_k(close, hh, ll) - 100.0
}
