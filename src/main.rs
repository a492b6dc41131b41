// =============================================================================
// Aurora Analysis — Main Entry Point
// =============================================================================
//
// One-shot run: load config, read every configured symbol's series from the
// data directory, analyse each symbol and print the reports as pretty JSON.
// =============================================================================

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use aurora_analysis::market_data::JsonDirProvider;
use aurora_analysis::types::Severity;
use aurora_analysis::{AnalysisEngine, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("ANALYSIS_CONFIG").unwrap_or_else(|_| "engine_config.json".into());
    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("ANALYSIS_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(dir) = std::env::var("ANALYSIS_DATA_DIR") {
        config.data_dir = dir;
    }
    if config.symbols.is_empty() {
        anyhow::bail!("no symbols configured");
    }

    info!(
        symbols = ?config.symbols,
        timeframes = ?config.timeframes,
        primary = %config.primary_timeframe,
        data_dir = %config.data_dir,
        "Analysis run starting"
    );

    // ── 2. Engine & provider ─────────────────────────────────────────────
    let provider = Arc::new(JsonDirProvider::new(&config.data_dir));
    let symbols = config.symbols.clone();
    let engine = Arc::new(AnalysisEngine::new(config));

    // ── 3. Analyse every symbol concurrently ─────────────────────────────
    let handles: Vec<_> = symbols
        .iter()
        .map(|symbol| {
            let engine = engine.clone();
            let provider = provider.clone();
            let sym = symbol.clone();
            tokio::spawn(async move { engine.analyze_symbol(provider.as_ref(), &sym, None).await })
        })
        .collect();

    // ── 4. Report in configured order ────────────────────────────────────
    let mut failures = 0usize;
    for (symbol, handle) in symbols.iter().zip(handles) {
        match handle.await? {
            Ok(report) => {
                for alert in &report.alerts {
                    if alert.severity.rank() >= Severity::High.rank() {
                        warn!(symbol = %symbol, kind = %alert.kind, severity = %alert.severity, "{}", alert.message);
                    } else {
                        info!(symbol = %symbol, kind = %alert.kind, severity = %alert.severity, "{}", alert.message);
                    }
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(e) => {
                failures += 1;
                error!(symbol = %symbol, error = %e, "Analysis failed");
            }
        }
    }

    info!(
        analysed = symbols.len() - failures,
        failed = failures,
        "Analysis run complete"
    );
    Ok(())
}
