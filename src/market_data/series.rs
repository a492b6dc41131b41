use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single price/volume bar. Prices and volume must be finite and
/// non-negative; see [`PriceSeries::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Bar open time in epoch milliseconds. Only used for gap detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<i64>,
}

impl PriceBar {
    pub fn new(high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            high,
            low,
            close,
            volume,
            open_time: None,
        }
    }

    pub fn with_open_time(mut self, open_time: i64) -> Self {
        self.open_time = Some(open_time);
        self
    }

    /// `(high + low + close) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Bar interval label such as `"5m"`, `"1h"` or `"1d"`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeframe(pub String);

impl Timeframe {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nominal bar length, when the label is of the form `<n><unit>` with unit
    /// one of `s`, `m`, `h`, `d`, `w` and the length fits a [`TimeDelta`].
    pub fn duration(&self) -> Option<TimeDelta> {
        let label = self.0.trim();
        let unit = label.chars().last()?;
        let count: i64 = label[..label.len() - unit.len_utf8()].parse().ok()?;
        if count <= 0 {
            return None;
        }
        match unit {
            's' => TimeDelta::try_seconds(count),
            'm' => TimeDelta::try_minutes(count),
            'h' => TimeDelta::try_hours(count),
            'd' => TimeDelta::try_days(count),
            'w' => TimeDelta::try_weeks(count),
            _ => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timeframe {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Oldest-first bar sequence for one symbol on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<Timeframe>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Reject empty series and bars carrying non-finite or negative values.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.bars.is_empty() {
            return Err(AnalysisError::invalid(&self.symbol, "price series is empty"));
        }
        for (i, bar) in self.bars.iter().enumerate() {
            let fields = [
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            for (name, value) in fields {
                if !value.is_finite() {
                    return Err(AnalysisError::invalid(
                        &self.symbol,
                        format!("bar {i} has non-finite {name}"),
                    ));
                }
                if value < 0.0 {
                    return Err(AnalysisError::invalid(
                        &self.symbol,
                        format!("bar {i} has negative {name} ({value})"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Count consecutive bars whose `open_time` spacing exceeds 1.5x the
    /// nominal timeframe length. Bars without timestamps never count, nor do
    /// pairs whose spacing overflows `i64`.
    pub fn count_gaps(&self) -> usize {
        let Some(step) = self.timeframe.duration() else {
            return 0;
        };
        let limit = step.num_milliseconds() as f64 * 1.5;
        self.bars
            .windows(2)
            .filter(|w| match (w[0].open_time, w[1].open_time) {
                (Some(a), Some(b)) => b.checked_sub(a).is_some_and(|d| d as f64 > limit),
                _ => false,
            })
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> PriceBar {
        PriceBar::new(close + 1.0, close - 1.0, close, 100.0)
    }

    #[test]
    fn timeframe_durations() {
        assert_eq!(Timeframe::from("5m").duration(), Some(TimeDelta::minutes(5)));
        assert_eq!(Timeframe::from("1h").duration(), Some(TimeDelta::hours(1)));
        assert_eq!(Timeframe::from("1d").duration(), Some(TimeDelta::days(1)));
        assert_eq!(Timeframe::from("2w").duration(), Some(TimeDelta::weeks(2)));
        assert_eq!(Timeframe::from("daily").duration(), None);
        assert_eq!(Timeframe::from("0m").duration(), None);
        assert_eq!(Timeframe::from("").duration(), None);
    }

    #[test]
    fn out_of_range_labels_have_no_duration() {
        assert_eq!(Timeframe::from("99999999999999999s").duration(), None);
        assert_eq!(Timeframe::from("9223372036854775807w").duration(), None);
        let s = PriceSeries::new("BTCUSDT", "99999999999999999s", vec![bar(1.0), bar(2.0)]);
        assert_eq!(s.count_gaps(), 0);
    }

    #[test]
    fn overflowing_open_times_are_skipped() {
        let bars = vec![
            bar(100.0).with_open_time(i64::MIN),
            bar(101.0).with_open_time(i64::MAX),
            bar(102.0).with_open_time(i64::MAX),
        ];
        let s = PriceSeries::new("BTCUSDT", "1m", bars);
        assert_eq!(s.count_gaps(), 0);
    }

    #[test]
    fn validate_accepts_clean_series() {
        let s = PriceSeries::new("BTCUSDT", "1h", vec![bar(100.0), bar(101.0)]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let s = PriceSeries::new("BTCUSDT", "1h", Vec::new());
        assert!(matches!(s.validate(), Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn validate_rejects_nan_and_negative() {
        let mut nan = bar(100.0);
        nan.close = f64::NAN;
        let s = PriceSeries::new("BTCUSDT", "1h", vec![bar(100.0), nan]);
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("bar 1 has non-finite close"));

        let mut neg = bar(100.0);
        neg.volume = -5.0;
        let s = PriceSeries::new("BTCUSDT", "1h", vec![neg]);
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("negative volume"));
    }

    #[test]
    fn gaps_detected_from_open_times() {
        let hour = 3_600_000;
        let bars = vec![
            bar(100.0).with_open_time(0),
            bar(101.0).with_open_time(hour),
            bar(102.0).with_open_time(4 * hour), // missing two bars
            bar(103.0).with_open_time(5 * hour),
        ];
        let s = PriceSeries::new("BTCUSDT", "1h", bars);
        assert_eq!(s.count_gaps(), 1);
    }

    #[test]
    fn gaps_ignored_without_timestamps() {
        let s = PriceSeries::new("BTCUSDT", "1h", vec![bar(1.0), bar(2.0), bar(3.0)]);
        assert_eq!(s.count_gaps(), 0);
    }

    #[test]
    fn typical_price() {
        let b = PriceBar::new(12.0, 9.0, 10.5, 0.0);
        assert!((b.typical_price() - 10.5).abs() < 1e-12);
    }
}
