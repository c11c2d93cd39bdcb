//! Run artifact export — trade tape (CSV/JSON) and run manifest.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use backcast_core::config::RunConfig;
use backcast_core::domain::{Trade, TradeAction};
use backcast_core::fingerprint::DatasetHash;
use backcast_core::report::{ReportStats, TradeReport};

/// Everything needed to identify and reproduce a run, written alongside
/// the trade tape as `manifest.json`.
#[derive(Debug, Serialize)]
struct RunManifest {
    run_id: String,
    dataset_hash: String,
    report_hash: String,
    config: RunConfig,
    stats: ReportStats,
}

/// Save the full artifact set under `<output_dir>/run-<id>/`.
///
/// Returns the run directory. The directory name derives from the config
/// hash, so re-running an identical config overwrites its own artifacts.
pub fn save_artifacts(
    report: &TradeReport,
    config: &RunConfig,
    dataset: &DatasetHash,
    output_dir: &Path,
) -> Result<PathBuf> {
    let run_id = config.run_id();
    let run_dir = output_dir.join(format!("run-{}", &run_id.0[..12]));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;

    write_trades_csv(&run_dir.join("trades.csv"), &report.trades)?;
    write_trades_json(&run_dir.join("trades.json"), &report.trades)?;

    let manifest = RunManifest {
        run_id: run_id.0,
        dataset_hash: dataset.0.clone(),
        report_hash: report.report_hash().0,
        config: config.clone(),
        stats: report.stats.clone(),
    };
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(run_dir.join("manifest.json"), json)
        .with_context(|| format!("Failed to write manifest in {}", run_dir.display()))?;

    Ok(run_dir)
}

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "action,open_ts,open_price,close_ts,close_price,amount,pnl,still_open"
    )?;

    for trade in trades {
        let action = match trade.action {
            TradeAction::Long => "Long",
            TradeAction::Short => "Short",
        };
        writeln!(
            file,
            "{},{},{:.4},{},{:.4},{},{:.4},{}",
            action,
            trade.open_ts.to_rfc3339(),
            trade.open_price,
            trade.close_ts.to_rfc3339(),
            trade.close_price,
            trade.amount,
            trade.pnl,
            trade.still_open
        )?;
    }

    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("Failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write trades JSON {}", path.display()))?;
    Ok(())
}
