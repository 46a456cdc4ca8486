//! Formatted terminal output for the `report` command.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::NaiveDate;

use crate::domain::{DatasetStats, EnrichedRecord, Metric};
use crate::pipeline::{fmt_proportion, metric_value};

/// Format the dataset summary header.
pub fn format_dataset_summary(stats: &DatasetStats, population_entries: usize) -> String {
    let mut out = String::new();

    out.push_str("=== covsnap - US COVID Metric Snapshots ===\n");
    out.push_str(&format!(
        "Records: {} | States: {} | Dates: {} .. {}\n",
        stats.n_records, stats.n_states, stats.first_date, stats.last_date
    ));
    out.push_str(&format!("Population entries: {population_entries}\n"));

    out
}

/// Format one snapshot date as a top-N table ordered by the chosen metric.
///
/// Records for which the metric is undefined (a proportion with no resolved
/// population) sink to the bottom and render a `-`; they are shown, not
/// dropped, so gaps stay visible.
pub fn format_snapshot(
    date: NaiveDate,
    slice: &[&EnrichedRecord],
    metric: Metric,
    top_n: usize,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\nSnapshot {date} — {} (top {top_n}):\n",
        metric.display_name()
    ));
    out.push_str(&format!(
        "{:<4} {:<22} {:>10} {:>8} {:>10} {:>12}\n",
        "code", "state", "cases", "deaths", "total", "proportion"
    ));

    let mut ranked: Vec<&EnrichedRecord> = slice.to_vec();
    // Descending; undefined metric values sort below defined ones (None < Some).
    ranked.sort_by(|a, b| {
        let av = metric_value(a, metric);
        let bv = metric_value(b, metric);
        bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
    });

    for r in ranked.iter().take(top_n) {
        out.push_str(&format!(
            "{:<4} {:<22} {:>10} {:>8} {:>10} {:>12}\n",
            r.code.unwrap_or("-"),
            r.state,
            r.cases,
            r.deaths,
            r.total,
            r.proportion
                .map(|p| format!("{} %", fmt_proportion(p)))
                .unwrap_or_else(|| "-".to_string()),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::pipeline::{enrich, slice_by_date};
    use std::collections::BTreeMap;

    fn raw(state: &str, cases: &str, deaths: &str) -> RawRecord {
        RawRecord {
            state: state.to_string(),
            date: "2020-03-01".to_string(),
            cases: Some(cases.to_string()),
            deaths: Some(deaths.to_string()),
        }
    }

    #[test]
    fn snapshot_ranks_by_metric_and_marks_gaps() {
        let mut population = BTreeMap::new();
        population.insert("Wyoming".to_string(), 578_759u64);
        let records = enrich(
            &[raw("California", "100", "5"), raw("Wyoming", "10", "0")],
            &population,
        )
        .unwrap();
        let date = records[0].date;
        let slice = slice_by_date(&records, date);

        let total = format_snapshot(date, &slice, Metric::Total, 10);
        let ca = total.find("California").unwrap();
        let wy = total.find("Wyoming").unwrap();
        assert!(ca < wy, "larger total first");
        // California has no population entry: shown with a dash, not dropped.
        assert!(total.lines().any(|l| l.contains("California") && l.trim_end().ends_with('-')));

        let prop = format_snapshot(date, &slice, Metric::Proportion, 10);
        let ca = prop.find("California").unwrap();
        let wy = prop.find("Wyoming").unwrap();
        assert!(wy < ca, "undefined proportion sinks to the bottom");
        assert!(prop.contains('%'));
    }

    #[test]
    fn summary_contains_span_and_counts() {
        let records = enrich(&[raw("California", "1", "0")], &BTreeMap::new()).unwrap();
        let stats = crate::pipeline::compute_stats(&records).unwrap();
        let out = format_dataset_summary(&stats, 51);
        assert!(out.contains("Records: 1"));
        assert!(out.contains("2020-03-01"));
        assert!(out.contains("Population entries: 51"));
    }
}
