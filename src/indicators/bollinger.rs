// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(period); upper / lower = middle ± k·σ, where σ is the
// population standard deviation of the same window.

use serde::{Deserialize, Serialize};

/// Upper / middle / lower envelope shared by Bollinger and Keltner channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Bands {
    /// Collapsed envelope where all three lines sit on `price`.
    pub fn flat(price: f64) -> Self {
        Self {
            upper: price,
            middle: price,
            lower: price,
        }
    }
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// When fewer than `period` closes exist (or the period is zero) all three
/// bands collapse onto the last close.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Bands {
    let last = closes.last().copied().unwrap_or(0.0);
    if period == 0 || closes.len() < period {
        return Bands::flat(last);
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let band = num_std * variance.sqrt();

    Bands {
        upper: middle + band,
        middle,
        lower: middle - band,
    }
}
