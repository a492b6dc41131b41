// =============================================================================
// Engine error taxonomy
// =============================================================================
//
// Insufficient data is not an error: every indicator degrades to a
// documented neutral value instead of failing the report.

use thiserror::Error;

/// Errors that abort a single `analyze` call.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A bar carried a non-finite or negative value, or the series was empty.
    #[error("invalid input for {symbol}: {reason}")]
    InvalidInput { symbol: String, reason: String },

    /// The price data provider failed. Not retried inside the engine.
    #[error("price data unavailable for {symbol}@{timeframe}: {reason}")]
    UpstreamUnavailable {
        symbol: String,
        timeframe: String,
        reason: String,
    },

    /// The symbol's analysis did not finish within the configured deadline.
    #[error("analysis of {symbol} timed out after {timeout_ms} ms")]
    Timeout { symbol: String, timeout_ms: u64 },
}

impl AnalysisError {
    pub fn invalid(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UpstreamUnavailable {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            reason: reason.into(),
        }
    }
}
