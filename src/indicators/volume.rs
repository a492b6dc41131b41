// =============================================================================
// Volume-flow indicators: OBV, VWAP, CMF, MFI
// =============================================================================
//
// OBV : running sum of +volume on up closes, -volume on down closes.
// VWAP: Σ(typical · volume) / Σ volume over the whole series.
// CMF : Σ(MFM · volume) / Σ volume over `period`,
//        MFM = ((C - L) - (H - C)) / (H - L).
// MFI : 100 - 100 / (1 + positive_flow / negative_flow) over `period`
//        typical-price transitions.
// =============================================================================

use crate::market_data::PriceBar;

/// OBV after every bar; the first bar starts the running total at 0.
pub fn obv_series(bars: &[PriceBar]) -> Vec<f64> {
    let mut result = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev = bars[i - 1].close;
            if bar.close > prev {
                obv += bar.volume;
            } else if bar.close < prev {
                obv -= bar.volume;
            }
        }
        result.push(obv);
    }
    result
}

pub fn calculate_obv(bars: &[PriceBar]) -> f64 {
    obv_series(bars).last().copied().unwrap_or(0.0)
}

/// Volume-weighted typical price over the full series. Falls back to the last
/// close when no volume traded.
pub fn calculate_vwap(bars: &[PriceBar]) -> f64 {
    let (weighted, volume) = bars.iter().fold((0.0, 0.0), |(w, v), b| {
        (w + b.typical_price() * b.volume, v + b.volume)
    });
    if volume > 0.0 {
        weighted / volume
    } else {
        bars.last().map_or(0.0, |b| b.close)
    }
}

/// Chaikin Money Flow in [-1, 1]. Returns 0.0 with fewer than `period` bars
/// or no volume; bars without range contribute nothing.
pub fn calculate_cmf(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period {
        return 0.0;
    }
    let window = &bars[bars.len() - period..];
    let (flow, volume) = window.iter().fold((0.0, 0.0), |(f, v), b| {
        let range = b.high - b.low;
        let multiplier = if range > 0.0 {
            ((b.close - b.low) - (b.high - b.close)) / range
        } else {
            0.0
        };
        (f + multiplier * b.volume, v + b.volume)
    });
    if volume > 0.0 {
        flow / volume
    } else {
        0.0
    }
}

/// Money Flow Index in [0, 100]. Returns 50 with fewer than `period + 1`
/// bars or when no money flowed in either direction.
pub fn calculate_mfi(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 50.0;
    }
    let start = bars.len() - period;
    let mut positive = 0.0;
    let mut negative = 0.0;
    for i in start..bars.len() {
        let tp = bars[i].typical_price();
        let prev_tp = bars[i - 1].typical_price();
        let flow = tp * bars[i].volume;
        if tp > prev_tp {
            positive += flow;
        } else if tp < prev_tp {
            negative += flow;
        }
    }
    if negative == 0.0 {
        return if positive == 0.0 { 50.0 } else { 100.0 };
    }
    let ratio = positive / negative;
    (100.0 - 100.0 / (1.0 + ratio)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64, volume: f64) -> PriceBar {
        PriceBar::new(high, low, close, volume)
    }

    fn rising(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let c = 90.0 + i as f64;
                bar(c + 0.5, c - 0.5, c, 1000.0)
            })
            .collect()
    }

    #[test]
    fn obv_accumulates_by_direction() {
        let bars = vec![
            bar(11.0, 9.0, 10.0, 100.0),
            bar(12.0, 10.0, 11.0, 200.0), // up
            bar(12.0, 10.0, 11.0, 300.0), // unchanged
            bar(11.0, 9.0, 10.0, 50.0),   // down
        ];
        assert_eq!(obv_series(&bars), vec![0.0, 200.0, 200.0, 150.0]);
        assert_eq!(calculate_obv(&bars), 150.0);
        assert_eq!(calculate_obv(&bars[..1]), 0.0);
    }

    #[test]
    fn obv_strictly_increasing_on_rising_closes() {
        let series = obv_series(&rising(30));
        assert!(series.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn vwap_weights_by_volume() {
        let bars = vec![bar(10.0, 10.0, 10.0, 1.0), bar(20.0, 20.0, 20.0, 3.0)];
        assert!((calculate_vwap(&bars) - 17.5).abs() < 1e-10);
    }

    #[test]
    fn vwap_without_volume_is_last_close() {
        let bars = vec![bar(10.0, 8.0, 9.0, 0.0), bar(12.0, 10.0, 11.0, 0.0)];
        assert_eq!(calculate_vwap(&bars), 11.0);
    }

    #[test]
    fn cmf_closes_at_high_is_one() {
        let bars: Vec<PriceBar> = (0..21).map(|_| bar(10.0, 8.0, 10.0, 500.0)).collect();
        assert!((calculate_cmf(&bars, 21) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn cmf_degenerate_cases() {
        assert_eq!(calculate_cmf(&rising(5), 21), 0.0);
        let no_volume: Vec<PriceBar> = (0..21).map(|_| bar(10.0, 8.0, 9.0, 0.0)).collect();
        assert_eq!(calculate_cmf(&no_volume, 21), 0.0);
        let flat: Vec<PriceBar> = (0..21).map(|_| bar(9.0, 9.0, 9.0, 10.0)).collect();
        assert_eq!(calculate_cmf(&flat, 21), 0.0);
    }

    #[test]
    fn mfi_defaults_and_extremes() {
        assert_eq!(calculate_mfi(&rising(10), 14), 50.0);
        assert_eq!(calculate_mfi(&rising(30), 14), 100.0);
        let falling: Vec<PriceBar> = rising(30).into_iter().rev().collect();
        assert!(calculate_mfi(&falling, 14).abs() < 1e-10);
        let flat = vec![bar(10.0, 9.0, 9.5, 100.0); 30];
        assert_eq!(calculate_mfi(&flat, 14), 50.0);
    }

    #[test]
    fn mfi_in_range_on_mixed_data() {
        let bars: Vec<PriceBar> = (0..80)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.45).sin() * 6.0;
                bar(c + 1.0, c - 1.0, c, 100.0 + (i % 7) as f64 * 40.0)
            })
            .collect();
        for end in 1..=bars.len() {
            let mfi = calculate_mfi(&bars[..end], 14);
            assert!((0.0..=100.0).contains(&mfi), "MFI {mfi} out of range");
        }
    }
}
