// =============================================================================
// Ichimoku Cloud
// =============================================================================
//
// Each line is the midpoint of the highest high and lowest low over its
// look-back:
//   Tenkan   (9)   Kijun (26)   Senkou B (52)
//   Senkou A = (Tenkan + Kijun) / 2
//   Chikou   = current close
// The cloud reads bullish when Senkou A sits above Senkou B.

use serde::{Deserialize, Serialize};

use crate::market_data::PriceBar;

const TENKAN_PERIOD: usize = 9;
const KIJUN_PERIOD: usize = 26;
const SENKOU_B_PERIOD: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IchimokuResult {
    pub tenkan: f64,
    pub kijun: f64,
    pub senkou_a: f64,
    pub senkou_b: f64,
    pub chikou: f64,
}

impl IchimokuResult {
    pub fn is_bullish(&self) -> bool {
        self.senkou_a > self.senkou_b
    }
}

fn midpoint(bars: &[PriceBar], period: usize) -> f64 {
    let window = &bars[bars.len() - period..];
    let (hh, ll) = window
        .iter()
        .fold((f64::MIN, f64::MAX), |(hh, ll), b| (hh.max(b.high), ll.min(b.low)));
    (hh + ll) / 2.0
}

/// Latest Ichimoku lines. All zero with fewer than 52 bars.
pub fn calculate_ichimoku(bars: &[PriceBar]) -> IchimokuResult {
    if bars.len() < SENKOU_B_PERIOD {
        return IchimokuResult::default();
    }
    let tenkan = midpoint(bars, TENKAN_PERIOD);
    let kijun = midpoint(bars, KIJUN_PERIOD);
    IchimokuResult {
        tenkan,
        kijun,
        senkou_a: (tenkan + kijun) / 2.0,
        senkou_b: midpoint(bars, SENKOU_B_PERIOD),
        chikou: bars[bars.len() - 1].close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(n: usize, step: f64) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64 * step;
                PriceBar::new(c + 1.0, c - 1.0, c, 10.0)
            })
            .collect()
    }

    #[test]
    fn short_series_is_zero() {
        let result = calculate_ichimoku(&trend(51, 1.0));
        assert_eq!(result, IchimokuResult::default());
        assert!(!result.is_bullish());
    }

    #[test]
    fn uptrend_cloud_is_bullish() {
        let bars = trend(60, 1.0);
        let result = calculate_ichimoku(&bars);
        // Last close 159; tenkan window 151..=159 => (160 + 150) / 2.
        assert!((result.tenkan - 155.0).abs() < 1e-10);
        assert!((result.chikou - 159.0).abs() < 1e-10);
        assert!((result.senkou_a - (result.tenkan + result.kijun) / 2.0).abs() < 1e-10);
        assert!(result.is_bullish());
    }

    #[test]
    fn downtrend_cloud_is_bearish() {
        let result = calculate_ichimoku(&trend(60, -1.0));
        assert!(!result.is_bullish());
        assert!(result.senkou_b > result.senkou_a);
    }
}
