use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use mina_rust_lib::{run_batch, write_table_csv, Config, FailurePolicy, GraphFileExtractor};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "MiNA - Mitochondrial Network Analysis batch processing")]
struct Args {
    /// Root directory with skeleton graph records
    root_directory: PathBuf,

    /// Regex matched against the start of each file name (e.g. ".*_cp_skel_[0-9]*.*")
    pattern: String,

    /// Output .csv file path
    output: PathBuf,

    /// Pixels per physical unit (e.g. 4.61 pixels = 1 um)
    #[clap(short, long)]
    scale: Option<f64>,

    /// Unit label for scaled columns (e.g. "um")
    #[clap(short, long)]
    unit_name: Option<String>,

    /// Path to a TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Process images one at a time
    #[clap(long)]
    sequential: bool,

    /// Stop the batch at the first image that fails
    #[clap(long)]
    abort_on_error: bool,

    /// Write the effective configuration to this path before running
    #[clap(long)]
    save_config: Option<PathBuf>,

    /// Print per-image details
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments; clap prints usage and exits non-zero on missing positionals
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    // Override config with command-line arguments
    config.root_directory = args.root_directory;
    config.pattern = args.pattern;
    config.output_path = args.output;

    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(unit_name) = args.unit_name {
        config.unit_name = Some(unit_name);
    }
    if args.sequential {
        config.use_parallel = false;
    }
    if args.abort_on_error {
        config.failure_policy = FailurePolicy::Abort;
    }

    if let Some(path) = &args.save_config {
        config.save_to_file(path)
            .with_context(|| format!("saving configuration to {}", path.display()))?;
        info!("Saved configuration to {}", path.display());
    }

    let report = run_batch(&config, &GraphFileExtractor::new())
        .context("batch analysis failed")?;

    for failure in &report.skipped {
        warn!("Skipped {}: {}", failure.path.display(), failure.reason);
    }

    write_table_csv(&report.table, &config.output_path)
        .with_context(|| format!("writing results to {}", config.output_path.display()))?;

    info!(
        "Wrote {} rows to {}",
        report.table.len(),
        config.output_path.display()
    );

    Ok(())
}
