//! Shared "load pipeline" logic used by the report, export, and TUI
//! front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source fetch/cache -> CSV ingest -> normalization -> stats/date index
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::source::{read_text, DataCache, CENSUS_CACHE_NAME, DATA_CACHE_NAME};
use crate::data::{generate_sample, sample::sample_population};
use crate::domain::{DatasetStats, EnrichedRecord, RawRecord, SnapshotConfig};
use crate::error::AppError;
use crate::io::ingest::{parse_population_csv, parse_raw_csv};
use crate::pipeline::{compute_stats, dates, enrich};

/// Everything the front-ends need from one load.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<EnrichedRecord>,
    /// Distinct dates, ascending; the slider/animation domain.
    pub dates: Vec<NaiveDate>,
    pub stats: DatasetStats,
    pub population_entries: usize,
}

/// Load both tables, run the normalization pipeline, and index the result.
pub fn run_load(config: &SnapshotConfig) -> Result<RunOutput, AppError> {
    let cache = DataCache::new(&config.cache_dir);

    let population = load_population(config, &cache)?;
    let raw = load_raw(config, &cache)?;

    let records = enrich(&raw, &population).map_err(AppError::from)?;
    let stats = compute_stats(&records)
        .ok_or_else(|| AppError::new(2, "Dataset is empty: no records to display."))?;
    let dates = dates(&records);

    Ok(RunOutput {
        records,
        dates,
        stats,
        population_entries: population.len(),
    })
}

fn load_raw(config: &SnapshotConfig, cache: &DataCache) -> Result<Vec<RawRecord>, AppError> {
    if config.sample {
        return Ok(generate_sample(config.sample_seed, config.sample_days));
    }

    let body = match &config.data_path {
        Some(path) => read_text(path)?,
        None => cache.load(&config.data_url, DATA_CACHE_NAME, config.refresh, config.offline)?,
    };
    parse_raw_csv(&body)
}

fn load_population(
    config: &SnapshotConfig,
    cache: &DataCache,
) -> Result<BTreeMap<String, u64>, AppError> {
    // A local population file wins even in sample mode.
    if let Some(path) = &config.population_path {
        return parse_population_csv(&read_text(path)?);
    }
    if config.sample {
        return Ok(sample_population(config.sample_seed));
    }
    let body = cache.load(
        &config.census_url,
        CENSUS_CACHE_NAME,
        config.refresh,
        config.offline,
    )?;
    parse_population_csv(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, DEFAULT_FRAME_DELAY_MS};

    fn sample_config() -> SnapshotConfig {
        SnapshotConfig {
            data_path: None,
            data_url: "https://unreachable.invalid/us-states.csv".to_string(),
            population_path: None,
            census_url: "https://unreachable.invalid/census.csv".to_string(),
            cache_dir: "target/never-created".into(),
            refresh: false,
            offline: true,
            sample: true,
            sample_seed: 42,
            sample_days: 30,
            target_date: None,
            metric: Metric::Total,
            top_n: 15,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }

    #[test]
    fn sample_load_is_network_free_and_indexed() {
        let run = run_load(&sample_config()).unwrap();
        assert_eq!(run.dates.len(), 30);
        assert_eq!(run.stats.first_date, *run.dates.first().unwrap());
        assert_eq!(run.stats.last_date, *run.dates.last().unwrap());
        assert_eq!(run.records.len(), run.stats.n_records);
        assert!(run.population_entries > 0);
    }

    #[test]
    fn local_files_bypass_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        let pop = dir.path().join("pop.csv");
        std::fs::write(&data, "date,state,cases,deaths\n2020-03-01,California,10,0\n").unwrap();
        std::fs::write(&pop, "state,pop\nCalifornia,39500000\n").unwrap();

        let mut config = sample_config();
        config.sample = false;
        config.data_path = Some(data);
        config.population_path = Some(pop);

        let run = run_load(&config).unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].code, Some("CA"));
        assert_eq!(run.records[0].proportion, Some(0.0));
    }
}
