// =============================================================================
// Fibonacci Retracements
// =============================================================================
//
// Over the look-back window the highest high and lowest low define `range`;
// each level sits `ratio * range` below the high.

use serde::{Deserialize, Serialize};

use crate::market_data::PriceBar;

pub const RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_500: f64,
    pub level_618: f64,
    pub level_786: f64,
}

impl FibonacciLevels {
    /// Retracements over the last `lookback` bars (or all bars when fewer).
    pub fn from_bars(bars: &[PriceBar], lookback: usize) -> Self {
        let window = &bars[bars.len().saturating_sub(lookback.max(1))..];
        let (high, low) = if window.is_empty() {
            (0.0, 0.0)
        } else {
            window
                .iter()
                .fold((f64::MIN, f64::MAX), |(hh, ll), b| (hh.max(b.high), ll.min(b.low)))
        };
        let range = high - low;
        let at = |ratio: f64| high - range * ratio;
        Self {
            high,
            low,
            level_236: at(RATIOS[0]),
            level_382: at(RATIOS[1]),
            level_500: at(RATIOS[2]),
            level_618: at(RATIOS[3]),
            level_786: at(RATIOS[4]),
        }
    }

    /// `(label, price)` for each retracement, shallowest first.
    pub fn levels(&self) -> [(&'static str, f64); 5] {
        [
            ("23.6%", self.level_236),
            ("38.2%", self.level_382),
            ("50.0%", self.level_500),
            ("61.8%", self.level_618),
            ("78.6%", self.level_786),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_between(low: f64, high: f64, n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let c = low + (high - low) * i as f64 / (n - 1) as f64;
                PriceBar::new(c, c, c, 1.0)
            })
            .collect()
    }

    #[test]
    fn known_levels() {
        let fib = FibonacciLevels::from_bars(&bars_between(100.0, 200.0, 11), 50);
        assert!((fib.high - 200.0).abs() < 1e-10);
        assert!((fib.low - 100.0).abs() < 1e-10);
        assert!((fib.level_236 - 176.4).abs() < 1e-9);
        assert!((fib.level_500 - 150.0).abs() < 1e-9);
        assert!((fib.level_786 - 121.4).abs() < 1e-9);
    }

    #[test]
    fn levels_are_strictly_descending() {
        let fib = FibonacciLevels::from_bars(&bars_between(37.0, 41.5, 80), 50);
        let levels = fib.levels();
        for pair in levels.windows(2) {
            assert!(pair[0].1 > pair[1].1, "{:?} should exceed {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn only_last_lookback_bars_count() {
        let mut bars = vec![PriceBar::new(1000.0, 1.0, 500.0, 1.0)];
        bars.extend(bars_between(100.0, 200.0, 50));
        let fib = FibonacciLevels::from_bars(&bars, 50);
        assert!((fib.high - 200.0).abs() < 1e-10);
        assert!((fib.low - 100.0).abs() < 1e-10);
    }

    #[test]
    fn single_bar_uses_its_range() {
        let fib = FibonacciLevels::from_bars(&[PriceBar::new(10.0, 9.0, 9.5, 100.0)], 50);
        assert!((fib.level_500 - 9.5).abs() < 1e-10);
    }
}
