// =============================================================================
// Simple & Exponential Moving Averages (SMA / EMA)
// =============================================================================
//
// SMA: arithmetic mean of the last `period` closes.
//
// EMA gives more weight to recent prices:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

/// Mean of the last `period` values.
///
/// Falls back to the last value when fewer than `period` values exist (or the
/// period is zero), and to 0.0 on empty input.
pub fn calculate_sma(values: &[f64], period: usize) -> f64 {
    let Some(&last) = values.last() else {
        return 0.0;
    };
    if period == 0 || values.len() < period {
        return last;
    }
    values[values.len() - period..].iter().sum::<f64>() / period as f64
}

/// EMA series for `closes`, one value per close from index `period - 1`.
///
/// Empty when `period == 0` or fewer than `period` closes exist. A
/// non-finite value (seed or step) ends the series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    let alpha = 2.0 / (period + 1) as f64;
    let (seed_window, rest) = closes.split_at(period);
    let seed = seed_window.iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    std::iter::once(seed)
        .chain(rest.iter().scan(seed, |ema, &close| {
            *ema = close * alpha + *ema * (1.0 - alpha);
            ema.is_finite().then_some(*ema)
        }))
        .collect()
}

/// EMA seeded with the first value instead of an SMA window: one output per
/// input, so the average is defined from the first bar. Stops at the first
/// non-finite value.
pub fn running_ema(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    if period == 0 || !first.is_finite() {
        return Vec::new();
    }
    let alpha = 2.0 / (period + 1) as f64;
    std::iter::once(first)
        .chain(values[1..].iter().scan(first, |ema, &v| {
            *ema = v * alpha + *ema * (1.0 - alpha);
            ema.is_finite().then_some(*ema)
        }))
        .collect()
}

/// Most recent EMA value, or the last close when there is not enough data to
/// seed the average.
pub fn current_ema(closes: &[f64], period: usize) -> f64 {
    calculate_ema(closes, period)
        .last()
        .copied()
        .or_else(|| closes.last().copied())
        .unwrap_or(0.0)
}
