// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator readings and the trend consensus into:
// - A composite 0..1 score with per-rule contributions
// - Discrete buy/sell signals
// - A buy/hold/sell recommendation

pub mod synthesizer;

pub use synthesizer::{
    synthesize, Recommendation, Signal, SignalContribution, SignalSummary, SignalThresholds,
};
