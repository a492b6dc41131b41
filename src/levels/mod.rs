// =============================================================================
// Support / Resistance Level Detection
// =============================================================================
//
// Combines three level sources into one strength-ranked view:
// - Classic floor pivots from the latest bar
// - Fibonacci retracements over a look-back window
// - Volume-weighted swing-point clusters
//
// Every level above the last close is resistance, everything else support.
// A level sitting exactly on the close keeps its nominal side. Pivots are
// placed by price too, since a bar with high < low can push R1 below the close.

pub mod extrema;
pub mod fibonacci;
pub mod pivot;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::market_data::PriceBar;

pub use fibonacci::FibonacciLevels;
pub use pivot::PivotPoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelOrigin {
    Pivot,
    Fibonacci,
    Volume,
}

impl std::fmt::Display for LevelOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pivot => write!(f, "pivot"),
            Self::Fibonacci => write!(f, "fibonacci"),
            Self::Volume => write!(f, "volume"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistanceLevel {
    pub price: f64,
    pub strength: f64,
    pub kind: LevelKind,
    pub origin: LevelOrigin,
    /// Source-specific name such as `"R1"`, `"61.8%"` or `"cluster x3"`.
    pub label: String,
}

/// Tuning for the level detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    pub fibonacci_lookback: usize,
    pub swing_window: usize,
    pub cluster_tolerance_pct: f64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            fibonacci_lookback: 50,
            swing_window: 2,
            cluster_tolerance_pct: 0.5,
        }
    }
}

const PIVOT_STRENGTHS: [f64; 3] = [0.8, 0.6, 0.4];
const FIBONACCI_STRENGTHS: [f64; 5] = [0.5, 0.6, 0.7, 0.8, 0.6];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<SupportResistanceLevel>,
    pub resistance: Vec<SupportResistanceLevel>,
    pub pivot: PivotPoints,
    pub fibonacci: FibonacciLevels,
}

impl LevelSet {
    /// Resistance level closest to `price`, if any.
    pub fn nearest_resistance(&self, price: f64) -> Option<&SupportResistanceLevel> {
        self.resistance
            .iter()
            .min_by(|a, b| (a.price - price).abs().total_cmp(&(b.price - price).abs()))
    }

    /// Support level closest to `price`, if any.
    pub fn nearest_support(&self, price: f64) -> Option<&SupportResistanceLevel> {
        self.support
            .iter()
            .min_by(|a, b| (a.price - price).abs().total_cmp(&(b.price - price).abs()))
    }
}

/// Detect support and resistance levels for `bars` (oldest first).
///
/// Returns `None` only for an empty slice.
pub fn detect_levels(bars: &[PriceBar], params: &LevelParams) -> Option<LevelSet> {
    let last = bars.last()?;
    let close = last.close;

    let pivot = PivotPoints::from_bar(last);
    let fibonacci = FibonacciLevels::from_bars(bars, params.fibonacci_lookback);

    let mut support = Vec::new();
    let mut resistance = Vec::new();

    let mut place = |lvl: SupportResistanceLevel| match lvl.kind {
        LevelKind::Resistance => resistance.push(lvl),
        LevelKind::Support => support.push(lvl),
    };

    for (i, (label, price)) in pivot.resistances().into_iter().enumerate() {
        let kind = if price >= close { LevelKind::Resistance } else { LevelKind::Support };
        place(level(price, PIVOT_STRENGTHS[i], kind, LevelOrigin::Pivot, label));
    }
    for (i, (label, price)) in pivot.supports().into_iter().enumerate() {
        let kind = if price <= close { LevelKind::Support } else { LevelKind::Resistance };
        place(level(price, PIVOT_STRENGTHS[i], kind, LevelOrigin::Pivot, label));
    }

    for (i, (label, price)) in fibonacci.levels().into_iter().enumerate() {
        let kind = if price >= close { LevelKind::Resistance } else { LevelKind::Support };
        place(level(price, FIBONACCI_STRENGTHS[i], kind, LevelOrigin::Fibonacci, label));
    }

    for cluster in extrema::find_clusters(bars, params.swing_window, params.cluster_tolerance_pct) {
        let label = format!("cluster x{}", cluster.touches);
        let kind = if cluster.price > close { LevelKind::Resistance } else { LevelKind::Support };
        place(level(cluster.price, cluster.strength, kind, LevelOrigin::Volume, &label));
    }

    rank(&mut support, close);
    rank(&mut resistance, close);

    trace!(
        support = support.len(),
        resistance = resistance.len(),
        pivot = pivot.pivot,
        "levels detected"
    );

    Some(LevelSet {
        support,
        resistance,
        pivot,
        fibonacci,
    })
}

fn level(price: f64, strength: f64, kind: LevelKind, origin: LevelOrigin, label: &str) -> SupportResistanceLevel {
    SupportResistanceLevel {
        price,
        strength,
        kind,
        origin,
        label: label.to_string(),
    }
}

/// Strongest first; equal strengths ordered by proximity to `close`.
fn rank(levels: &mut [SupportResistanceLevel], close: f64) {
    levels.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| (a.price - close).abs().total_cmp(&(b.price - close).abs()))
    });
}
