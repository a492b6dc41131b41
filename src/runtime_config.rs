// =============================================================================
// Runtime Configuration — engine settings with atomic save
// =============================================================================
//
// Central configuration for the analysis engine: which symbols and
// timeframes to analyse, indicator periods, level tuning, signal and alert
// thresholds, and the per-symbol analysis deadline.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry serde defaults so that adding new fields never
// breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alerts::AlertThresholds;
use crate::engine::AnalysisParams;
use crate::indicators::IndicatorParams;
use crate::levels::LevelParams;
use crate::signals::SignalThresholds;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_symbols() -> Vec<String> {
    vec![
        "BTCUSDT".to_string(),
        "ETHUSDT".to_string(),
        "BNBUSDT".to_string(),
        "XRPUSDT".to_string(),
        "SOLUSDT".to_string(),
    ]
}

fn default_timeframes() -> Vec<String> {
    vec!["15m".to_string(), "1h".to_string(), "4h".to_string()]
}

fn default_primary_timeframe() -> String {
    "1h".to_string()
}

fn default_analysis_timeout_ms() -> u64 {
    5_000
}

fn default_data_dir() -> String {
    "data".to_string()
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the analysis engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Universe -----------------------------------------------------------

    /// Symbols the binary analyses on each run.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Timeframes fetched per symbol and voted on by the trend aggregator.
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<String>,

    /// Timeframe whose series drives indicators, levels, signals and alerts.
    #[serde(default = "default_primary_timeframe")]
    pub primary_timeframe: String,

    /// Directory read by the JSON file price provider.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    // --- Execution ----------------------------------------------------------

    /// Deadline for one symbol's fetch + analysis, milliseconds.
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,

    /// Keep the last report per symbol in memory.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    // --- Analysis parameters ------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub levels: LevelParams,

    #[serde(default)]
    pub signals: SignalThresholds,

    #[serde(default)]
    pub alerts: AlertThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            timeframes: default_timeframes(),
            primary_timeframe: default_primary_timeframe(),
            data_dir: default_data_dir(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            cache_enabled: true,
            indicators: IndicatorParams::default(),
            levels: LevelParams::default(),
            signals: SignalThresholds::default(),
            alerts: AlertThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            timeframes = ?config.timeframes,
            primary = %config.primary_timeframe,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Timeframes to fetch, with the primary one guaranteed present.
    pub fn fetch_timeframes(&self) -> Vec<String> {
        let mut tfs = self.timeframes.clone();
        if !tfs.iter().any(|tf| tf == &self.primary_timeframe) {
            tfs.push(self.primary_timeframe.clone());
        }
        tfs
    }

    /// Analysis parameters derived from this config.
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams {
            indicators: self.indicators.clone(),
            levels: self.levels.clone(),
            signals: self.signals.clone(),
            alerts: self.alerts.clone(),
        }
    }
}
