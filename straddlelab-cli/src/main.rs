//! StraddleLab CLI — run the strategy pipeline from the command line.
//!
//! Commands:
//! - `run` — execute the pipeline from a TOML config and CSV data
//!   directory (or synthetic data), print the report, optionally write
//!   the full result as JSON

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use straddlelab_runner::{
    load_market_data, run_pipeline, synthetic_market_data, PipelineResult, SilentProgress,
    StdoutProgress, StrategyConfig,
};

#[derive(Parser)]
#[command(
    name = "straddlelab",
    about = "StraddleLab CLI — lookback-straddle trend strategy engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the pipeline from a TOML config file.
    Run {
        /// Path to the strategy TOML config.
        #[arg(long)]
        config: PathBuf,

        /// Directory holding last/high/low/fx/rates CSV files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Generate synthetic data instead of reading CSVs.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Days of synthetic history to generate.
        #[arg(long, default_value_t = 750)]
        synthetic_days: usize,

        /// Seed for the synthetic generator.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Write the full result (panels, returns, report) as JSON.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress stage progress lines.
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data_dir,
            synthetic,
            synthetic_days,
            seed,
            output,
            quiet,
        } => run(config, data_dir, synthetic, synthetic_days, seed, output, quiet),
    }
}

fn run(
    config_path: PathBuf,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    synthetic_days: usize,
    seed: u64,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let config = StrategyConfig::from_path(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let data = match (&data_dir, synthetic) {
        (Some(dir), false) => load_market_data(dir)
            .with_context(|| format!("loading market data from {}", dir.display()))?,
        (None, true) => {
            let assets: Vec<&str> = config.assets.iter().map(|a| a.name.as_str()).collect();
            synthetic_market_data(&assets, synthetic_days, seed)
        }
        (Some(_), true) => bail!("--data-dir and --synthetic are mutually exclusive"),
        (None, false) => bail!("either --data-dir or --synthetic is required"),
    };

    let result = if quiet {
        run_pipeline(&data, &config, &SilentProgress)?
    } else {
        run_pipeline(&data, &config, &StdoutProgress)?
    };

    print_report(&result);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing result to {}", path.display()))?;
        println!("\nfull result written to {}", path.display());
    }
    Ok(())
}

fn print_report(result: &PipelineResult) {
    let report = &result.report;
    println!("\nrun {}", &result.run_id[..16.min(result.run_id.len())]);
    println!("{:-<44}", "");
    println!("{:<28}{:>16.4}", "annualized mean", report.mean);
    println!("{:<28}{:>16.4}", "annualized std", report.std);
    println!("{:<28}{:>16.4}", "sharpe", report.sharpe);
    println!("{:<28}{:>16.4}", "skew", report.skew);
    println!("{:<28}{:>16.4}", "excess kurtosis", report.kurtosis);
    println!("{:<28}{:>16.4}", "max drawdown", report.max_drawdown);
    println!(
        "{:<28}{:>16}",
        "max drawdown duration", report.max_drawdown_duration
    );
    println!("{:<28}{:>16.4}", "terminal cum. return", report.terminal);
    if report.non_finite_inputs {
        println!("\nwarning: non-finite values reached the portfolio return series;");
        println!("statistics above may be NaN — inspect the input data for gaps");
    }
}
