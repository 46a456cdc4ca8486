//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (with env-var defaults)
//! - loads the case/death and population tables
//! - runs the normalization pipeline
//! - dispatches to the report/export/TUI front-ends

use clap::Parser;

use crate::cli::{Command, ExportArgs, ViewArgs};
use crate::data::source::{DEFAULT_CENSUS_URL, DEFAULT_DATA_URL};
use crate::domain::SnapshotConfig;
use crate::error::AppError;
use crate::pipeline::slice_by_date;

pub mod pipeline;

/// Entry point for the `covsnap` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `covsnap` and `covsnap --sample` to behave like `covsnap tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_report(args: ViewArgs) -> Result<(), AppError> {
    let config = snapshot_config_from_args(&args);
    let run = pipeline::run_load(&config)?;

    print!(
        "{}",
        crate::report::format_dataset_summary(&run.stats, run.population_entries)
    );

    let date = config.target_date.unwrap_or(run.stats.last_date);
    let slice = slice_by_date(&run.records, date);
    if slice.is_empty() {
        return Err(AppError::new(2, format!("No records for date {date}.")));
    }
    print!(
        "{}",
        crate::report::format_snapshot(date, &slice, config.metric, config.top_n)
    );

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = snapshot_config_from_args(&args.view);
    let run = pipeline::run_load(&config)?;

    crate::io::export::write_enriched_csv(&args.out, &run.records)?;
    println!(
        "Wrote {} records to '{}'.",
        run.records.len(),
        args.out.display()
    );
    Ok(())
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    let config = snapshot_config_from_args(&args);
    crate::tui::run(&config)
}

pub fn snapshot_config_from_args(args: &ViewArgs) -> SnapshotConfig {
    SnapshotConfig {
        data_path: args.data.clone(),
        data_url: args
            .data_url
            .clone()
            .or_else(|| std::env::var("COVID_DATA_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATA_URL.to_string()),
        population_path: args.population.clone(),
        census_url: args
            .census_url
            .clone()
            .or_else(|| std::env::var("COVID_CENSUS_URL").ok())
            .unwrap_or_else(|| DEFAULT_CENSUS_URL.to_string()),
        cache_dir: args
            .cache_dir
            .clone()
            .or_else(|| std::env::var("COVID_CACHE_DIR").ok().map(Into::into))
            .unwrap_or_else(|| "data".into()),
        refresh: args.refresh,
        offline: args.offline,
        sample: args.sample,
        sample_seed: args.seed,
        sample_days: args.sample_days,
        target_date: args.date,
        metric: args.metric,
        top_n: args.top,
        frame_delay_ms: args.frame_delay_ms,
    }
}

/// Rewrite argv so `covsnap` defaults to `covsnap tui`.
///
/// Rules:
/// - `covsnap`                     -> `covsnap tui`
/// - `covsnap --sample ...`        -> `covsnap tui --sample ...`
/// - `covsnap --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
