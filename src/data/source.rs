//! File-backed fetch cache for remote CSV sources.
//!
//! The cache is explicit: entries are plain files in a cache directory, keyed
//! by a stable cache file name, and invalidation is a deliberate delete (the
//! `--refresh` flag), never a hidden memo. The normalization pipeline itself
//! does no I/O; every network or filesystem failure surfaces here as a source
//! error and is never conflated with a pipeline error.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::AppError;

/// Default remote sources: the NYT per-state case/death table and the Census
/// county population estimates (filtered to state-level rows at ingest).
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-states.csv";
pub const DEFAULT_CENSUS_URL: &str = "https://www2.census.gov/programs-surveys/popest/datasets/2010-2019/counties/totals/co-est2019-alldata.csv";

/// Cache file names for the default sources.
pub const DATA_CACHE_NAME: &str = "us-states.csv";
pub const CENSUS_CACHE_NAME: &str = "co-est2019-alldata.csv";

pub struct DataCache {
    cache_dir: PathBuf,
    client: Client,
}

impl DataCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client: Client::new(),
        }
    }

    /// Path of a cache entry.
    pub fn entry_path(&self, cache_name: &str) -> PathBuf {
        self.cache_dir.join(cache_name)
    }

    /// Delete a cached entry if present.
    pub fn invalidate(&self, cache_name: &str) -> Result<(), AppError> {
        let path = self.entry_path(cache_name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AppError::new(
                    2,
                    format!("Failed to invalidate cache '{}': {e}", path.display()),
                )
            })?;
        }
        Ok(())
    }

    /// Return the body for `url`, from the cache when possible.
    ///
    /// `refresh` invalidates the entry first; `offline` forbids the fetch and
    /// fails when no cached copy exists.
    pub fn load(
        &self,
        url: &str,
        cache_name: &str,
        refresh: bool,
        offline: bool,
    ) -> Result<String, AppError> {
        if refresh {
            self.invalidate(cache_name)?;
        }

        let path = self.entry_path(cache_name);
        if path.exists() {
            return read_text(&path);
        }

        if offline {
            return Err(AppError::new(
                2,
                format!(
                    "Offline and no cached copy of {cache_name} in '{}'. \
                     Run once without --offline, or pass a local file.",
                    self.cache_dir.display()
                ),
            ));
        }

        let body = self.fetch(url)?;

        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create cache dir '{}': {e}", self.cache_dir.display()),
            )
        })?;
        fs::write(&path, &body).map_err(|e| {
            AppError::new(2, format!("Failed to write cache '{}': {e}", path.display()))
        })?;

        Ok(body)
    }

    fn fetch(&self, url: &str) -> Result<String, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request to {url} failed with status {}.", resp.status()),
            ));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| AppError::new(4, format!("Failed to read body from {url}: {e}")))?;

        // The Census file is Latin-1; decode lossily since only its ASCII
        // columns are ever consumed.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Read a local file as text (lossy, same reasoning as the fetch path).
pub fn read_text(path: &Path) -> Result<String, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hit_never_touches_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::new(dir.path());
        fs::write(dir.path().join("us-states.csv"), "date,state,cases,deaths\n").unwrap();

        // Offline + cached: must return the cached body.
        let body = cache
            .load("https://unreachable.invalid/x.csv", "us-states.csv", false, true)
            .unwrap();
        assert_eq!(body, "date,state,cases,deaths\n");
    }

    #[test]
    fn offline_without_cache_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::new(dir.path());
        let err = cache
            .load("https://unreachable.invalid/x.csv", "us-states.csv", false, true)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn refresh_invalidates_the_cached_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::new(dir.path());
        let path = dir.path().join("us-states.csv");
        fs::write(&path, "stale").unwrap();

        // Refresh deletes the entry; offline then fails because nothing is
        // cached anymore (no silent reuse of stale data).
        let err = cache
            .load("https://unreachable.invalid/x.csv", "us-states.csv", true, true)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!path.exists());
    }

    #[test]
    fn read_text_decodes_latin1_bytes_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        // "Do\xf1a Ana County" as Latin-1 bytes.
        fs::write(&path, b"STNAME,CTYNAME\nNew Mexico,Do\xf1a Ana County\n").unwrap();
        let body = read_text(&path).unwrap();
        assert!(body.contains("New Mexico"));
    }
}
