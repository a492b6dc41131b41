// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd_line   = EMA(fast) - EMA(slow)
//   signal_line = EMA(signal) of the historical macd_line series
//   histogram   = macd_line - signal_line
//
// All three averages are seeded with their first input and run over the whole
// history, so the line carries the EMAs' convergence from the first bar. A
// reading is reported once `slow` closes exist; it is considered warmed up
// after `slow + signal - 1` closes.
//
// Defaults: fast 12, slow 26, signal 9.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::running_ema;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

impl MacdResult {
    /// MACD above its signal line with a positive histogram.
    pub fn is_bullish(&self) -> bool {
        self.macd_line > self.signal_line && self.histogram > 0.0
    }

    /// MACD below its signal line with a negative histogram.
    pub fn is_bearish(&self) -> bool {
        self.macd_line < self.signal_line && self.histogram < 0.0
    }
}

/// Closes needed before the signal line averages a full `signal` window of
/// MACD values that each had `slow` closes behind them.
pub fn warmup_bars(slow: usize, signal: usize) -> usize {
    slow + signal.saturating_sub(1)
}

/// MACD line with one value per close. Empty when `closes.len() < slow`,
/// `fast == 0` or `fast >= slow`.
pub fn macd_line_series(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if fast == 0 || fast >= slow || closes.len() < slow {
        return Vec::new();
    }
    running_ema(closes, fast)
        .into_iter()
        .zip(running_ema(closes, slow))
        .map(|(f, s)| f - s)
        .collect()
}

/// Compute the latest MACD reading.
///
/// Returns the all-zero [`MacdResult`] when fewer than `slow` closes exist.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    let line = macd_line_series(closes, fast, slow);
    let Some(&macd_line) = line.last() else {
        return MacdResult::default();
    };

    let signal_line = running_ema(&line, signal).last().copied().unwrap_or(macd_line);

    MacdResult {
        macd_line,
        signal_line,
        histogram: macd_line - signal_line,
    }
}
