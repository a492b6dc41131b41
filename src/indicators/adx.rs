// =============================================================================
// Directional Movement Index (DMI) & Average Directional Index (ADX)
// =============================================================================
//
// Calculation pipeline:
//   1. +DM / -DM and True Range per bar transition.
//   2. Wilder's running sums over `period` of +DM, -DM, TR.
//   3. +DI = sum(+DM) / sum(TR) * 100,  -DI = sum(-DM) / sum(TR) * 100
//   4. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   5. ADX = Wilder's smoothed average of DX over `period` values.
//
// Interpretation: ADX > 25 trending, ADX < 20 ranging.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DmiResult {
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
}

/// Directional indicators from smoothed sums; all zero when there is no
/// true range to divide by.
fn directional_indicators(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64, f64) {
    if smooth_tr <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let plus_di = smooth_plus_dm / smooth_tr * 100.0;
    let minus_di = smooth_minus_dm / smooth_tr * 100.0;
    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        0.0
    } else {
        (plus_di - minus_di).abs() / di_sum * 100.0
    };
    (plus_di, minus_di, dx)
}

/// Compute the latest ADX and DI readings.
///
/// Returns all zeros with fewer than `2 * period + 1` bars: `period`
/// transitions seed the Wilder sums and another `period` DX values seed the
/// ADX average.
pub fn calculate_dmi(bars: &[PriceBar], period: usize) -> DmiResult {
    if period == 0 || bars.len() < 2 * period + 1 {
        return DmiResult::default();
    }
    let period_f = period as f64;

    let mut plus_dm = Vec::with_capacity(bars.len() - 1);
    let mut minus_dm = Vec::with_capacity(bars.len() - 1);
    let mut tr_vals = Vec::with_capacity(bars.len() - 1);

    for w in bars.windows(2) {
        let (prev, bar) = (&w[0], &w[1]);
        let tr = (bar.high - bar.low)
            .max((bar.high - prev.close).abs())
            .max((bar.low - prev.close).abs());

        let up_move = bar.high - prev.high;
        let down_move = prev.low - bar.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
        tr_vals.push(tr);
    }

    let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

    let (mut di_plus, mut di_minus, first_dx) =
        directional_indicators(smooth_plus_dm, smooth_minus_dm, smooth_tr);
    let mut dx_values = Vec::with_capacity(tr_vals.len() - period + 1);
    dx_values.push(first_dx);

    for i in period..tr_vals.len() {
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];

        let (p, m, dx) = directional_indicators(smooth_plus_dm, smooth_minus_dm, smooth_tr);
        di_plus = p;
        di_minus = m;
        dx_values.push(dx);
    }

    // Seed ADX with the SMA of the first `period` DX values, then smooth.
    let mut adx = dx_values[..period].iter().sum::<f64>() / period_f;
    for &dx in &dx_values[period..] {
        adx = (adx * (period_f - 1.0) + dx) / period_f;
    }

    if !(adx.is_finite() && di_plus.is_finite() && di_minus.is_finite()) {
        return DmiResult::default();
    }

    DmiResult {
        adx,
        di_plus,
        di_minus,
    }
}
