// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of every indicator the engine
// reports. Insufficient data never produces an error: each function returns a
// documented neutral value instead so a short series still yields a report.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod ichimoku;
pub mod keltner;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod set;
pub mod stochastic;
pub mod volume;

pub use set::{IndicatorCategory, IndicatorParams, IndicatorSet, IndicatorValue};
