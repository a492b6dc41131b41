// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
//   avg_gain, avg_loss seeded as the plain mean of the first `period` moves,
//   then rolled forward with Wilder's factor 1/period:
//     avg = (avg * (period - 1) + move) / period
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS)
//
// No movement at all reads 50; gains with no losses read 100.
// =============================================================================

/// Running Wilder averages of up and down moves.
#[derive(Debug, Clone, Copy)]
struct GainLoss {
    gain: f64,
    loss: f64,
}

impl GainLoss {
    fn seed(deltas: &[f64]) -> Self {
        let n = deltas.len() as f64;
        let (gain, loss) = deltas.iter().fold((0.0, 0.0), |(g, l), &d| {
            (g + d.max(0.0), l + (-d).max(0.0))
        });
        Self {
            gain: gain / n,
            loss: loss / n,
        }
    }

    fn roll(&mut self, delta: f64, period: f64) {
        self.gain = (self.gain * (period - 1.0) + delta.max(0.0)) / period;
        self.loss = (self.loss * (period - 1.0) + (-delta).max(0.0)) / period;
    }

    fn rsi(&self) -> Option<f64> {
        let value = match (self.gain > 0.0, self.loss > 0.0) {
            (false, false) => 50.0,
            (true, false) => 100.0,
            _ => 100.0 - 100.0 / (1.0 + self.gain / self.loss),
        };
        value.is_finite().then_some(value)
    }
}

/// RSI series with one value per close from index `period` onward.
///
/// Empty when `period == 0` or fewer than `period + 1` closes exist. A
/// non-finite reading truncates the series at that point.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = deltas.split_at(period);
    let period_f = period as f64;

    let mut avg = GainLoss::seed(seed);
    let mut out = Vec::with_capacity(rest.len() + 1);
    let Some(first) = avg.rsi() else {
        return out;
    };
    out.push(first);

    for &delta in rest {
        avg.roll(delta, period_f);
        match avg.rsi() {
            Some(v) => out.push(v),
            None => break,
        }
    }
    out
}

/// Latest RSI, or the neutral 50.0 when the series is too short.
pub fn current_rsi(closes: &[f64], period: usize) -> f64 {
    calculate_rsi(closes, period).last().copied().unwrap_or(50.0)
}
