//! Export the enriched table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts. We go through `csv::Writer` because the hover text is multi-line
//! and must be quoted correctly.

use std::fs::File;
use std::path::Path;

use crate::domain::EnrichedRecord;
use crate::error::AppError;
use crate::pipeline::fmt_proportion;

/// Write the enriched records to a CSV file, one row per record, preserving
/// table order.
pub fn write_enriched_csv(path: &Path, records: &[EnrichedRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "state", "code", "cases", "deaths", "total", "proportion", "text"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.date.to_string(),
                r.state.clone(),
                r.code.unwrap_or_default().to_string(),
                r.cases.to_string(),
                r.deaths.to_string(),
                r.total.to_string(),
                r.proportion.map(fmt_proportion).unwrap_or_default(),
                r.hover_text.clone(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::enrich;
    use crate::domain::RawRecord;
    use std::collections::BTreeMap;

    #[test]
    fn writes_header_and_quotes_multiline_hover_text() {
        let raw = vec![RawRecord {
            state: "California".to_string(),
            date: "2020-03-01".to_string(),
            cases: Some("10".to_string()),
            deaths: Some("0".to_string()),
        }];
        let mut population = BTreeMap::new();
        population.insert("California".to_string(), 39_500_000u64);
        let records = enrich(&raw, &population).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");
        write_enriched_csv(&path, &records).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("date,state,code,cases,deaths,total,proportion,text"));
        assert!(body.contains("2020-03-01,California,CA,10,0,10,0.0,"));
        // Multi-line hover text must arrive quoted, not split into rows.
        assert!(body.contains("\"California\nDate: 2020-03-01"));

        // A record with no code/proportion exports empty cells, not zeros.
        let raw = vec![RawRecord {
            state: "Atlantis".to_string(),
            date: "2020-03-01".to_string(),
            cases: Some("1".to_string()),
            deaths: Some("0".to_string()),
        }];
        let records = enrich(&raw, &BTreeMap::new()).unwrap();
        let path = dir.path().join("gaps.csv");
        write_enriched_csv(&path, &records).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("2020-03-01,Atlantis,,1,0,1,,"));
    }
}
