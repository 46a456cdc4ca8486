//! CSV ingest: case/death rows and population tables.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Total over rows**: a row with a missing or garbled cell still yields a
//!   `RawRecord`; the normalization pipeline owns per-row failures so it can
//!   name the exact row and field
//! - **Header-map driven**: column order never matters, extra columns (the
//!   NYT file carries `fips`) are ignored

use std::collections::{BTreeMap, HashMap};

use csv::StringRecord;

use crate::domain::RawRecord;
use crate::error::AppError;

/// Parse a case/death CSV body into raw records, preserving row order.
///
/// Expected columns (any order): `date`, `state`, `cases`, `deaths`.
pub fn parse_raw_csv(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["date", "state", "cases", "deaths"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(
                2,
                format!("Case data is missing required column: `{required}`"),
            ));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV line numbers are
        // 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("CSV parse error at line {line}: {e}")))?;

        records.push(RawRecord {
            state: get_optional(&record, &header_map, "state")
                .unwrap_or_default()
                .to_string(),
            date: get_optional(&record, &header_map, "date")
                .unwrap_or_default()
                .to_string(),
            cases: get_optional(&record, &header_map, "cases").map(str::to_string),
            deaths: get_optional(&record, &header_map, "deaths").map(str::to_string),
        });
    }

    Ok(records)
}

/// Parse a population CSV body into a state-name → population map.
///
/// Two formats are auto-detected by headers:
///
/// - Census county totals (`STNAME`, `CTYNAME`, `POPESTIMATE2019`): the
///   state-level rows are the ones where `STNAME == CTYNAME`.
/// - Simple two-column (`state`, `pop`/`population`).
///
/// Duplicate state names: last entry wins. Rows with a missing or non-positive
/// population are skipped (an absent population is a per-record gap downstream,
/// never a zero).
pub fn parse_population_csv(body: &str) -> Result<BTreeMap<String, u64>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read population CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let census = header_map.contains_key("stname")
        && header_map.contains_key("ctyname")
        && header_map.contains_key("popestimate2019");
    let simple = header_map.contains_key("state")
        && (header_map.contains_key("pop") || header_map.contains_key("population"));

    if !census && !simple {
        return Err(AppError::new(
            2,
            "Unrecognized population CSV: expected Census columns \
             (STNAME, CTYNAME, POPESTIMATE2019) or `state` + `pop`.",
        ));
    }

    let mut map = BTreeMap::new();
    for result in reader.records() {
        let Ok(record) = result else {
            // The Census file has ragged trailing rows; skip anything the
            // reader cannot shape.
            continue;
        };

        if census {
            let (Some(stname), Some(ctyname)) = (
                get_optional(&record, &header_map, "stname"),
                get_optional(&record, &header_map, "ctyname"),
            ) else {
                continue;
            };
            if stname != ctyname {
                continue;
            }
            if let Some(pop) = parse_population(get_optional(&record, &header_map, "popestimate2019")) {
                map.insert(stname.to_string(), pop);
            }
        } else {
            let Some(state) = get_optional(&record, &header_map, "state") else {
                continue;
            };
            let value = get_optional(&record, &header_map, "pop")
                .or_else(|| get_optional(&record, &header_map, "population"));
            if let Some(pop) = parse_population(value) {
                map.insert(state.to_string(), pop);
            }
        }
    }

    Ok(map)
}

fn parse_population(value: Option<&str>) -> Option<u64> {
    let pop = value?.parse::<u64>().ok()?;
    if pop > 0 { Some(pop) } else { None }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nyt_shaped_csv_ignoring_fips() {
        let body = "date,state,fips,cases,deaths\n\
                    2020-03-01,California,06,10,0\n\
                    2020-03-01,Washington,53,13,2\n";
        let records = parse_raw_csv(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, "California");
        assert_eq!(records[0].date, "2020-03-01");
        assert_eq!(records[0].cases.as_deref(), Some("10"));
        assert_eq!(records[1].deaths.as_deref(), Some("2"));
    }

    #[test]
    fn column_order_does_not_matter() {
        let body = "cases,deaths,state,date\n5,1,Ohio,2020-04-02\n";
        let records = parse_raw_csv(body).unwrap();
        assert_eq!(records[0].state, "Ohio");
        assert_eq!(records[0].cases.as_deref(), Some("5"));
    }

    #[test]
    fn strips_bom_on_first_header() {
        let body = "\u{feff}date,state,cases,deaths\n2020-03-01,Maine,1,0\n";
        let records = parse_raw_csv(body).unwrap();
        assert_eq!(records[0].date, "2020-03-01");
    }

    #[test]
    fn missing_cells_become_none_not_errors() {
        let body = "date,state,cases,deaths\n2020-03-01,Texas,,3\n";
        let records = parse_raw_csv(body).unwrap();
        assert_eq!(records[0].cases, None);
        assert_eq!(records[0].deaths.as_deref(), Some("3"));
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let body = "date,state,cases\n2020-03-01,Texas,1\n";
        let err = parse_raw_csv(body).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("deaths"));
    }

    #[test]
    fn census_format_keeps_state_level_rows_only() {
        let body = "SUMLEV,STNAME,CTYNAME,POPESTIMATE2019\n\
                    040,California,California,39512223\n\
                    050,California,Alameda County,1671329\n\
                    040,Wyoming,Wyoming,578759\n";
        let map = parse_population_csv(body).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("California"), Some(&39_512_223));
        assert_eq!(map.get("Wyoming"), Some(&578_759));
    }

    #[test]
    fn simple_format_and_duplicate_last_wins() {
        let body = "state,pop\nCalifornia,1\nCalifornia,39512223\nGuam,0\n";
        let map = parse_population_csv(body).unwrap();
        assert_eq!(map.get("California"), Some(&39_512_223));
        // Non-positive populations are skipped, not stored as zero.
        assert_eq!(map.get("Guam"), None);
    }

    #[test]
    fn unrecognized_population_schema_is_an_error() {
        let err = parse_population_csv("a,b\n1,2\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
