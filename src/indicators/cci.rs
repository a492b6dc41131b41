// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   TP  = (H + L + C) / 3
//   CCI = (TP - SMA(TP, period)) / (0.015 * mean_abs_deviation)

use crate::market_data::PriceBar;

const LAMBERT_CONSTANT: f64 = 0.015;

/// Latest CCI reading. Returns 0.0 with fewer than `period` bars or when the
/// window has no deviation.
pub fn calculate_cci(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period {
        return 0.0;
    }
    let typical: Vec<f64> = bars[bars.len() - period..]
        .iter()
        .map(PriceBar::typical_price)
        .collect();
    let mean = typical.iter().sum::<f64>() / period as f64;
    let mean_dev = typical.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
    if mean_dev <= f64::EPSILON * mean.abs().max(1.0) {
        return 0.0;
    }
    let current = typical[typical.len() - 1];
    (current - mean) / (LAMBERT_CONSTANT * mean_dev)
}
