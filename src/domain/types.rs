//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while slicing per-date snapshots
//! - exported to CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Per-frame delay of the play/animate loop, in milliseconds.
///
/// Matches the original dashboard's 0.06s sleep between frames.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 60;

/// Which value shades the choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Cumulative cases + deaths.
    Total,
    /// Percentage of the state's population affected (absent when the
    /// population lookup missed).
    Proportion,
}

impl Metric {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Total => "Total Affected",
            Metric::Proportion => "% Population Affected",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Metric::Total => Metric::Proportion,
            Metric::Proportion => Metric::Total,
        }
    }
}

/// One CSV row as read: one state, one day, cumulative counts.
///
/// Fields stay textual/optional here on purpose. Ingest is total (a row with a
/// missing cell still yields a `RawRecord`); the normalization pipeline owns
/// type conversion and raises the precise row-naming error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub state: String,
    pub date: String,
    pub cases: Option<String>,
    pub deaths: Option<String>,
}

/// A render-ready record: typed raw counts plus the derived display fields.
///
/// Only [`hover_text`](Self::hover_text) carries formatted text; everything
/// else keeps its proper numeric/date/optional type so downstream math never
/// runs on strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub state: String,
    pub date: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
    /// Two-letter postal abbreviation, absent when the state name is not in
    /// the fixed lookup table.
    pub code: Option<&'static str>,
    /// `cases + deaths`.
    pub total: u64,
    /// `(total / population) * 100`, rounded to 4 decimal places; absent when
    /// no population resolved for the state. Never substituted with zero.
    pub proportion: Option<f64>,
    /// Multi-line tooltip text: state, date, cases, deaths, and (when defined)
    /// the proportion line.
    pub hover_text: String,
}

/// Summary of an enriched dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_states: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// A full run's configuration as understood by the load pipeline.
///
/// This is derived from CLI flags plus env-var defaults.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Local case/death CSV. When unset, the dataset is fetched from
    /// `data_url` (through the file cache).
    pub data_path: Option<PathBuf>,
    pub data_url: String,

    /// Local population CSV. When unset, the Census file is fetched from
    /// `census_url` (through the file cache).
    pub population_path: Option<PathBuf>,
    pub census_url: String,

    pub cache_dir: PathBuf,
    /// Delete cached downloads before loading.
    pub refresh: bool,
    /// Never touch the network; cache/file only.
    pub offline: bool,

    /// Generate a synthetic dataset instead of loading one.
    pub sample: bool,
    pub sample_seed: u64,
    pub sample_days: usize,

    /// Snapshot date for `report`/`export` (default: latest in the data).
    pub target_date: Option<NaiveDate>,
    pub metric: Metric,
    pub top_n: usize,
    pub frame_delay_ms: u64,
}
