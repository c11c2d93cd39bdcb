//! Backcast CLI — run backtests and generate synthetic candle data.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file or named preset,
//!   over a candle CSV or a seeded synthetic series
//! - `generate` — write a seeded synthetic candle CSV

mod artifacts;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use backcast_core::config::RunConfig;
use backcast_core::data::{load_candles_csv, synthetic_candles, write_candles_csv, VecSource};
use backcast_core::engine::Session;
use backcast_core::fingerprint::dataset_hash;
use backcast_core::report::TradeReport;

#[derive(Parser)]
#[command(
    name = "backcast",
    about = "Backcast CLI — candle-replay backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: ma_crossover, roc_momentum.
        #[arg(long)]
        preset: Option<String>,

        /// Candle CSV file (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Replay this many synthetic candles instead of reading a CSV.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for synthetic candle generation.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory for run artifacts. Nothing is written when omitted.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write a seeded synthetic candle CSV.
    Generate {
        /// Number of candles.
        #[arg(long, default_value_t = 1260)]
        count: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file path.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            preset,
            csv,
            synthetic,
            seed,
            output_dir,
        } => run_backtest_cmd(config, preset, csv, synthetic, seed, output_dir),
        Commands::Generate {
            count,
            seed,
            output,
        } => run_generate(count, seed, &output),
    }
}

fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    preset_name: Option<String>,
    csv: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    // Validate mutually exclusive options
    if config_path.is_some() && preset_name.is_some() {
        bail!("--config and --preset are mutually exclusive");
    }
    if config_path.is_none() && preset_name.is_none() {
        bail!("one of --config or --preset is required");
    }

    let run_config = if let Some(path) = config_path {
        RunConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
    } else {
        build_config_from_preset(&preset_name.unwrap_or_default())?
    };

    let candles = match (csv, synthetic) {
        (Some(_), Some(_)) => bail!("--csv and --synthetic are mutually exclusive"),
        (None, None) => bail!("one of --csv or --synthetic is required"),
        (Some(path), None) => load_candles_csv(&path)
            .with_context(|| format!("Failed to load candles {}", path.display()))?,
        (None, Some(count)) => synthetic_candles(count, seed),
    };
    let data_hash = dataset_hash(&candles);

    let mut session = Session::new(run_config.session_config());
    let mut strategy = run_config.build_strategy();
    let policy = run_config.build_stop_policy();
    let mut source = VecSource::new(candles);

    session.run(&mut source, strategy.as_mut(), policy.as_ref())?;
    let report = session.report()?;

    print_summary(&run_config, &report);

    if let Some(dir) = output_dir {
        let run_dir = artifacts::save_artifacts(&report, &run_config, &data_hash, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn build_config_from_preset(name: &str) -> Result<RunConfig> {
    // Presets are TOML strings parsed through the same path as config files.
    let toml_str = match name {
        "ma_crossover" => {
            r#"
[backtest]
amount = 1.0
reference_price = "close"

[backtest.stop]
type = "breakeven_then_trail"
initial_pct = 0.05
breakeven_trigger_pct = 0.05
trail_pct = 0.10

[strategy]
type = "ma_crossover"
fast_period = 10
slow_period = 50
ma_type = "sma"
"#
        }
        "roc_momentum" => {
            r#"
[backtest]
amount = 1.0
reference_price = "close"

[backtest.stop]
type = "fixed_percent"
pct = 0.08

[strategy]
type = "roc_momentum"
period = 20
threshold = 0.05
"#
        }
        _ => bail!("unknown preset '{name}'. Valid: ma_crossover, roc_momentum"),
    };

    Ok(RunConfig::from_toml(toml_str)?)
}

fn run_generate(count: usize, seed: u64, output: &std::path::Path) -> Result<()> {
    let candles = synthetic_candles(count, seed);
    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_candles_csv(file, &candles)?;
    println!(
        "Wrote {count} candles (seed {seed}) to {}",
        output.display()
    );
    Ok(())
}

fn print_summary(config: &RunConfig, report: &TradeReport) {
    println!();
    println!("=== Backtest Result ===");
    println!("Run ID:         {}", config.run_id());
    println!("Report Hash:    {}", report.report_hash());
    println!("Trades:         {}", report.stats.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Total PnL:      {:.4}", report.stats.total_pnl);
    println!("Gross Wins:     {:.4}", report.stats.gross_wins);
    println!("Gross Losses:   {:.4}", report.stats.gross_losses);
    println!("Win Rate:       {:.1}%", report.stats.win_rate * 100.0);
    match report.stats.profit_factor {
        Some(pf) => println!("Profit Factor:  {pf:.2}"),
        None => println!("Profit Factor:  n/a (no losing trades)"),
    }
    if report.trades.last().is_some_and(|t| t.still_open) {
        println!();
        println!("WARNING: position still open at end of stream (valued at last mark)");
    }
    println!();
}
