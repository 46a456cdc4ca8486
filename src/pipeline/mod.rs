//! The normalization pipeline: raw per-state daily rows + a population lookup
//! → an enriched, render-ready table.
//!
//! Design goals:
//! - **Pure transform** over its two inputs; no I/O, no hidden state
//! - **Row-naming errors** for the failures that would falsify counts
//!   (bad date text, absent/non-numeric cases or deaths)
//! - **Per-field degradation, never row drops**: a failed postal-code or
//!   population lookup leaves the affected field absent but keeps the record,
//!   so the date slider/animation never develops gaps

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{DatasetStats, EnrichedRecord, Metric, RawRecord};
use crate::error::EnrichError;
use crate::geo;

/// Enrich every raw record, in input order.
///
/// Steps per record: parse the date (strict `YYYY-MM-DD`), resolve the postal
/// code, compute `total = cases + deaths`, join the population to compute a
/// proportion, and assemble the hover text. Re-running with identical inputs
/// produces identical output.
pub fn enrich(
    raw: &[RawRecord],
    population: &BTreeMap<String, u64>,
) -> Result<Vec<EnrichedRecord>, EnrichError> {
    let mut out = Vec::with_capacity(raw.len());

    for (idx, record) in raw.iter().enumerate() {
        // Rows are 1-based in error messages, matching how people count CSV
        // data lines.
        let row = idx + 1;

        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|_| {
            EnrichError::MalformedDate {
                row,
                value: record.date.clone(),
            }
        })?;

        let code = geo::name_to_code(&record.state);

        let cases = parse_count(record.cases.as_deref(), row, &record.state, "cases")?;
        let deaths = parse_count(record.deaths.as_deref(), row, &record.state, "deaths")?;
        let total = cases + deaths;

        // Exact-match join; a miss leaves the proportion undefined rather than
        // zero so downstream math is never corrupted by a silent miss.
        let proportion = population
            .get(&record.state)
            .filter(|&&pop| pop > 0)
            .map(|&pop| round4(total as f64 / pop as f64 * 100.0));

        let hover_text = hover_text(&record.state, date, cases, deaths, proportion);

        out.push(EnrichedRecord {
            state: record.state.clone(),
            date,
            cases,
            deaths,
            code,
            total,
            proportion,
            hover_text,
        });
    }

    Ok(out)
}

fn parse_count(
    value: Option<&str>,
    row: usize,
    state: &str,
    field: &'static str,
) -> Result<u64, EnrichError> {
    value
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| EnrichError::MissingField {
            row,
            state: state.to_string(),
            field,
        })
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Format a proportion for display: up to 4 decimals, trailing zeros trimmed,
/// but always at least one decimal digit (`0.0`, not `0`).
pub fn fmt_proportion(value: f64) -> String {
    let mut s = format!("{value:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    s
}

/// Build the fixed multi-line tooltip. Field order is state, date, cases,
/// deaths, proportion; the proportion line is omitted entirely when undefined.
fn hover_text(
    state: &str,
    date: NaiveDate,
    cases: u64,
    deaths: u64,
    proportion: Option<f64>,
) -> String {
    let mut text = format!(
        "{state}\nDate: {date}\nCases: {cases}\nDeaths: {deaths}",
        date = date.format("%Y-%m-%d"),
    );
    if let Some(p) = proportion {
        text.push_str(&format!(
            "\nProportion of Population Affected: {} %",
            fmt_proportion(p)
        ));
    }
    text
}

/// Distinct dates present in the table, ascending.
pub fn dates(records: &[EnrichedRecord]) -> Vec<NaiveDate> {
    let set: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    set.into_iter().collect()
}

/// The records for one snapshot date, in table order.
pub fn slice_by_date<'a>(records: &'a [EnrichedRecord], date: NaiveDate) -> Vec<&'a EnrichedRecord> {
    records.iter().filter(|r| r.date == date).collect()
}

/// Metric value of a record, if defined for it.
pub fn metric_value(record: &EnrichedRecord, metric: Metric) -> Option<f64> {
    match metric {
        Metric::Total => Some(record.total as f64),
        Metric::Proportion => record.proportion,
    }
}

/// National cumulative total per date (for the trend chart).
pub fn national_trend(records: &[EnrichedRecord]) -> Vec<(NaiveDate, u64)> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in records {
        *by_date.entry(r.date).or_insert(0) += r.total;
    }
    by_date.into_iter().collect()
}

/// Summary stats over the enriched table. `None` when the table is empty.
pub fn compute_stats(records: &[EnrichedRecord]) -> Option<DatasetStats> {
    let first_date = records.iter().map(|r| r.date).min()?;
    let last_date = records.iter().map(|r| r.date).max()?;
    let states: BTreeSet<&str> = records.iter().map(|r| r.state.as_str()).collect();

    Some(DatasetStats {
        n_records: records.len(),
        n_states: states.len(),
        first_date,
        last_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(state: &str, date: &str, cases: &str, deaths: &str) -> RawRecord {
        RawRecord {
            state: state.to_string(),
            date: date.to_string(),
            cases: Some(cases.to_string()),
            deaths: Some(deaths.to_string()),
        }
    }

    fn pop(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries
            .iter()
            .map(|&(s, p)| (s.to_string(), p))
            .collect()
    }

    #[test]
    fn total_is_cases_plus_deaths() {
        let out = enrich(&[raw("Ohio", "2020-05-01", "1200", "34")], &pop(&[])).unwrap();
        assert_eq!(out[0].total, 1234);
        assert_eq!(out[0].cases, 1200);
        assert_eq!(out[0].deaths, 34);
    }

    #[test]
    fn california_example() {
        let out = enrich(
            &[raw("California", "2020-03-01", "10", "0")],
            &pop(&[("California", 39_500_000)]),
        )
        .unwrap();

        let r = &out[0];
        assert_eq!(r.total, 10);
        assert_eq!(r.code, Some("CA"));
        assert_eq!(r.proportion, Some(round4(10.0 / 39_500_000.0 * 100.0)));
        assert_eq!(r.proportion, Some(0.0));

        assert!(r.hover_text.contains("California"));
        assert!(r.hover_text.contains("2020-03-01"));
        assert!(r.hover_text.contains("Cases: 10"));
        assert!(r.hover_text.contains("Deaths: 0"));
        assert!(r.hover_text.contains("0.0 %"));
    }

    #[test]
    fn proportion_matches_rounded_ratio() {
        let out = enrich(
            &[raw("Wyoming", "2020-06-15", "1000", "13")],
            &pop(&[("Wyoming", 578_759)]),
        )
        .unwrap();
        let expected = round4(1013.0 / 578_759.0 * 100.0);
        assert_eq!(out[0].proportion, Some(expected));
    }

    #[test]
    fn population_miss_leaves_proportion_absent() {
        let out = enrich(&[raw("California", "2020-03-01", "10", "0")], &pop(&[])).unwrap();
        assert_eq!(out[0].proportion, None);
        // No percentage line at all, not an "undefined%" line.
        assert!(!out[0].hover_text.contains('%'));
        assert!(!out[0].hover_text.contains("Proportion"));
    }

    #[test]
    fn unknown_state_leaves_code_absent_but_keeps_the_row() {
        let out = enrich(
            &[raw("Atlantis", "2020-03-01", "5", "1")],
            &pop(&[("California", 39_500_000)]),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, None);
        assert_eq!(out[0].proportion, None);
        assert_eq!(out[0].total, 6);
    }

    #[test]
    fn malformed_date_is_fatal() {
        let err = enrich(&[raw("California", "03/01/2020", "10", "0")], &pop(&[])).unwrap_err();
        assert_eq!(
            err,
            EnrichError::MalformedDate {
                row: 1,
                value: "03/01/2020".to_string(),
            }
        );
    }

    #[test]
    fn missing_counts_are_fatal_and_name_the_row() {
        let records = vec![
            raw("Ohio", "2020-05-01", "1", "0"),
            RawRecord {
                state: "Texas".to_string(),
                date: "2020-05-01".to_string(),
                cases: None,
                deaths: Some("3".to_string()),
            },
        ];
        let err = enrich(&records, &pop(&[])).unwrap_err();
        assert_eq!(
            err,
            EnrichError::MissingField {
                row: 2,
                state: "Texas".to_string(),
                field: "cases",
            }
        );

        // Non-numeric is the same failure, not a silent zero.
        let err = enrich(&[raw("Ohio", "2020-05-01", "12", "n/a")], &pop(&[])).unwrap_err();
        assert!(matches!(err, EnrichError::MissingField { field: "deaths", .. }));
    }

    #[test]
    fn no_rows_dropped_and_order_preserved() {
        let records = vec![
            raw("Wyoming", "2020-03-02", "1", "0"),
            raw("Atlantis", "2020-03-01", "2", "0"),
            raw("California", "2020-03-01", "3", "0"),
        ];
        let out = enrich(&records, &pop(&[("California", 39_500_000)])).unwrap();
        assert_eq!(out.len(), records.len());
        let states: Vec<&str> = out.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["Wyoming", "Atlantis", "California"]);
    }

    #[test]
    fn enrich_is_idempotent() {
        let records = vec![
            raw("California", "2020-03-01", "10", "0"),
            raw("Texas", "2020-03-01", "7", "2"),
        ];
        let population = pop(&[("California", 39_500_000), ("Texas", 29_000_000)]);
        let a = enrich(&records, &population).unwrap();
        let b = enrich(&records, &population).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_population_is_treated_as_a_miss() {
        let out = enrich(
            &[raw("Guam", "2020-04-01", "9", "1")],
            &pop(&[("Guam", 0)]),
        )
        .unwrap();
        assert_eq!(out[0].proportion, None);
    }

    #[test]
    fn fmt_proportion_keeps_a_decimal_digit() {
        assert_eq!(fmt_proportion(0.0), "0.0");
        assert_eq!(fmt_proportion(0.1234), "0.1234");
        assert_eq!(fmt_proportion(1.23), "1.23");
        assert_eq!(fmt_proportion(2.0), "2.0");
    }

    #[test]
    fn round4_rounds_half_away() {
        assert_eq!(round4(0.12345), 0.1235);
        assert_eq!(round4(0.12344), 0.1234);
    }

    #[test]
    fn slicing_and_trend_helpers() {
        let records = vec![
            raw("California", "2020-03-01", "10", "0"),
            raw("Texas", "2020-03-01", "5", "1"),
            raw("California", "2020-03-02", "20", "1"),
        ];
        let out = enrich(&records, &pop(&[])).unwrap();

        let ds = dates(&out);
        assert_eq!(ds.len(), 2);
        assert!(ds[0] < ds[1]);

        let slice = slice_by_date(&out, ds[0]);
        assert_eq!(slice.len(), 2);

        let trend = national_trend(&out);
        assert_eq!(trend[0].1, 16);
        assert_eq!(trend[1].1, 21);

        let stats = compute_stats(&out).unwrap();
        assert_eq!(stats.n_records, 3);
        assert_eq!(stats.n_states, 2);
        assert_eq!(stats.first_date, ds[0]);
        assert_eq!(stats.last_date, ds[1]);
    }

    #[test]
    fn metric_value_respects_absent_proportion() {
        let out = enrich(&[raw("California", "2020-03-01", "10", "0")], &pop(&[])).unwrap();
        assert_eq!(metric_value(&out[0], Metric::Total), Some(10.0));
        assert_eq!(metric_value(&out[0], Metric::Proportion), None);
    }
}
