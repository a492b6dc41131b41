// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// Most recent ROC value. Returns 0.0 when there are not more than `period`
/// closes or the reference close is zero.
pub fn calculate_roc(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return 0.0;
    }
    let current = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - period];
    if base == 0.0 {
        0.0
    } else {
        (current - base) / base * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        // From 8 to 20 over 12 bars: (20 - 8) / 8 * 100 = 150%.
        assert!((calculate_roc(&closes, 12) - 150.0).abs() < 1e-10);
    }

    #[test]
    fn roc_insufficient_data() {
        assert_eq!(calculate_roc(&[1.0, 2.0, 3.0], 12), 0.0);
        assert_eq!(calculate_roc(&[0.0, 5.0], 1), 0.0);
    }
}
