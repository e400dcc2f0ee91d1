// Entry point and high-level CLI flow.
//
// One run is one batch: load every source table, normalize once, assemble
// the full report in memory, then write the JSON snapshot (and optionally
// the narrative prompt) and print a short summary.
mod alerts;
mod config;
mod error;
mod growth;
mod indicators;
mod loader;
mod output;
mod ranking;
mod reports;
mod scoring;
mod types;
mod util;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use config::{Config, ConfigOverrides, ZeroBaseline};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "membership_stats",
    about = "Yearly membership statistics: indicators, growth, scores, rankings and alerts"
)]
struct Cli {
    /// TOML config file (default: ./membership_stats.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the source tables
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Directory receiving the report files
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Growth reported from a zero baseline
    #[arg(long, value_enum)]
    zero_baseline: Option<ZeroBaseline>,
    /// Skip writing the narrative prompt
    #[arg(long)]
    no_prompt: bool,
    /// Print a config template and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Config::default_template());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref()).context("failed loading config")?;
    config.apply_overrides(ConfigOverrides {
        input_dir: cli.input,
        output_dir: cli.output,
        zero_baseline: cli.zero_baseline,
        no_prompt: cli.no_prompt,
    });
    info!(input = %config.input.dir.display(), output = %config.output.dir.display(), "starting run");

    let tables = loader::load_tables(&config.input).context("failed loading source tables")?;
    let dataset = loader::normalize(&tables).context("failed normalizing source tables")?;
    let load = &dataset.report;
    println!(
        "Processing dataset... ({} rows loaded from {} tables, {} kept)",
        util::format_int(load.total_rows),
        util::format_int(load.tables),
        util::format_int(load.kept_rows)
    );
    if load.dropped_bad_year > 0 {
        println!(
            "Note: {} rows skipped due to an invalid reference year.",
            util::format_int(load.dropped_bad_year)
        );
    }
    if load.coerced_money + load.coerced_counts > 0 {
        println!(
            "Info: {} monetary and {} count cells could not be parsed and were read as zero.",
            util::format_int(load.coerced_money),
            util::format_int(load.coerced_counts)
        );
    }
    println!();

    let report = reports::build_report(&dataset.rows, &dataset.fields, &config.engine);

    let report_path = config.report_path();
    output::write_json(&report_path, &report)
        .with_context(|| format!("failed writing {}", report_path.display()))?;
    if let Some(prompt_path) = config.prompt_path() {
        output::write_prompt(&prompt_path, &report, Local::now().date_naive())
            .with_context(|| format!("failed writing {}", prompt_path.display()))?;
    }

    println!("National series\n");
    println!(
        "{}\n",
        output::render_national_preview(&report, config.output.preview_rows)
    );
    println!("(Full report exported to {})", report_path.display());
    Ok(())
}
