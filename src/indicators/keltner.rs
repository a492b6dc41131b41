// =============================================================================
// Keltner Channels
// =============================================================================
//
//   middle = EMA(period) of closes
//   upper  = middle + multiplier · ATR(period)
//   lower  = middle - multiplier · ATR(period)

use crate::indicators::atr::calculate_atr;
use crate::indicators::bollinger::Bands;
use crate::indicators::ema::current_ema;
use crate::market_data::PriceBar;

/// Latest Keltner channel. With too little data the EMA falls back to the last
/// close and the ATR to 0.0, collapsing the channel onto that close.
pub fn calculate_keltner(bars: &[PriceBar], period: usize, multiplier: f64) -> Bands {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let middle = current_ema(&closes, period);
    let offset = multiplier * calculate_atr(bars, period);
    Bands {
        upper: middle + offset,
        middle,
        lower: middle - offset,
    }
}
