// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// True Range (TR) for each bar after the first:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the simple average of the last `period` TR values.
// Default period: 14
// =============================================================================

use crate::market_data::PriceBar;

/// True range of every bar that has a predecessor (`bars.len() - 1` values).
pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let bar = &w[1];
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

/// Compute the most recent ATR value from a slice of bars (oldest first).
///
/// Returns 0.0 when `period` is zero or there are fewer than `period + 1`
/// bars (each TR needs a previous close).
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }
    let tr = true_ranges(bars);
    let atr = tr[tr.len() - period..].iter().sum::<f64>() / period as f64;
    if atr.is_finite() {
        atr
    } else {
        0.0
    }
}
