//! Command-line parsing for the snapshot dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{Metric, DEFAULT_FRAME_DELAY_MS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covsnap", version, about = "US COVID Metric Snapshots (terminal dashboard)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (date slider, play/animate, map).
    ///
    /// This uses the same underlying load pipeline as `covsnap report`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(ViewArgs),
    /// Print the dataset summary and one date's snapshot table.
    Report(ViewArgs),
    /// Export the full enriched table to CSV.
    Export(ExportArgs),
}

/// Common options for loading and viewing the dataset.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Local case/death CSV (default: fetch the NYT table through the cache).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Local population CSV: Census county totals or a `state,pop` table
    /// (default: fetch the Census file through the cache).
    #[arg(long, value_name = "CSV")]
    pub population: Option<PathBuf>,

    /// Override the case data URL (also: COVID_DATA_URL).
    #[arg(long)]
    pub data_url: Option<String>,

    /// Override the Census population URL (also: COVID_CENSUS_URL).
    #[arg(long)]
    pub census_url: Option<String>,

    /// Cache directory for fetched files (also: COVID_CACHE_DIR).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Delete cached downloads before loading.
    #[arg(long)]
    pub refresh: bool,

    /// Never touch the network (cache or local files only).
    #[arg(long)]
    pub offline: bool,

    /// Generate a deterministic synthetic dataset instead of loading one.
    #[arg(long)]
    pub sample: bool,

    /// Random seed for the synthetic dataset.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of days in the synthetic dataset.
    #[arg(long, default_value_t = 120)]
    pub sample_days: usize,

    /// Snapshot date, YYYY-MM-DD (default: latest date in the data).
    #[arg(short = 'd', long)]
    pub date: Option<NaiveDate>,

    /// Which value shades the map / ranks the table.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Total)]
    pub metric: Metric,

    /// Show top-N states in the report table.
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Animation frame delay in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    pub frame_delay_ms: u64,
}

/// Options for `covsnap export`.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}
