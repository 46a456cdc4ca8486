//! Synthetic outbreak generator for offline demos.
//!
//! `--sample` produces a deterministic dataset shaped exactly like the NYT
//! table (cumulative per-state daily counts) so the whole dashboard runs with
//! no network. Same seed, same data.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};

use crate::domain::RawRecord;
use crate::geo::STATE_CODES;

/// First reported date in the original dataset; the sample starts there too.
const SAMPLE_START: (i32, u32, u32) = (2020, 1, 21);

/// Generate `days` days of cumulative counts for every state/territory in the
/// lookup table, date-major (all states for day 1, then day 2, ...), matching
/// the upstream file's layout.
pub fn generate_sample(seed: u64, days: usize) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(SAMPLE_START.0, SAMPLE_START.1, SAMPLE_START.2)
        .expect("valid sample start date");

    // Daily new-case noise. Log-normal keeps increments non-negative, so the
    // cumulative series is non-decreasing by construction.
    let noise = LogNormal::new(0.0, 0.8).expect("valid log-normal parameters");

    // Per-state series first (each state carries its own running totals), then
    // flattened date-major.
    let mut series: Vec<(&str, Vec<(u64, u64)>)> = Vec::with_capacity(STATE_CODES.len());
    for &(name, _) in STATE_CODES {
        // A per-state size factor stands in for population differences.
        let scale: f64 = rng.gen_range(2.0..80.0);
        let onset: usize = rng.gen_range(0..days.max(1) / 3 + 1);

        let mut cases = 0u64;
        let mut deaths = 0u64;
        let mut points = Vec::with_capacity(days);
        for day in 0..days {
            if day >= onset {
                let ramp = (day - onset + 1) as f64 / days.max(1) as f64;
                let new_cases = (noise.sample(&mut rng) * scale * ramp * 10.0) as u64;
                cases += new_cases;
                deaths += new_cases / 40;
            }
            points.push((cases, deaths));
        }
        series.push((name, points));
    }

    let mut out = Vec::with_capacity(days * series.len());
    for day in 0..days {
        let date = (start + Duration::days(day as i64)).format("%Y-%m-%d").to_string();
        for (name, points) in &series {
            let (cases, deaths) = points[day];
            out.push(RawRecord {
                state: (*name).to_string(),
                date: date.clone(),
                cases: Some(cases.to_string()),
                deaths: Some(deaths.to_string()),
            });
        }
    }
    out
}

/// A deterministic synthetic population table covering every state in the
/// lookup table, so proportions stay defined in `--sample` mode.
///
/// The seed is offset so the population draw never perturbs the case series
/// of [`generate_sample`] for the same seed.
pub fn sample_population(seed: u64) -> BTreeMap<String, u64> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    STATE_CODES
        .iter()
        .map(|&(name, _)| (name.to_string(), rng.gen_range(500_000..40_000_000u64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn same_seed_same_data() {
        assert_eq!(generate_sample(42, 30), generate_sample(42, 30));
    }

    #[test]
    fn covers_every_state_for_every_day() {
        let days = 10;
        let records = generate_sample(1, days);
        assert_eq!(records.len(), days * STATE_CODES.len());
        assert_eq!(records[0].date, "2020-01-21");
        assert_eq!(records.last().unwrap().date, "2020-01-30");
    }

    #[test]
    fn cumulative_counts_never_decrease() {
        let records = generate_sample(7, 40);
        let mut last: HashMap<&str, (u64, u64)> = HashMap::new();
        for r in &records {
            let cases: u64 = r.cases.as_deref().unwrap().parse().unwrap();
            let deaths: u64 = r.deaths.as_deref().unwrap().parse().unwrap();
            if let Some(&(prev_cases, prev_deaths)) = last.get(r.state.as_str()) {
                assert!(cases >= prev_cases, "{} cases decreased", r.state);
                assert!(deaths >= prev_deaths, "{} deaths decreased", r.state);
            }
            last.insert(r.state.as_str(), (cases, deaths));
        }
    }

    #[test]
    fn sample_survives_the_pipeline() {
        let records = generate_sample(3, 5);
        let population = sample_population(3);
        let enriched = crate::pipeline::enrich(&records, &population).unwrap();
        assert_eq!(enriched.len(), records.len());
        // Every sampled state is in the synthetic population table, so every
        // record carries a proportion.
        assert!(enriched.iter().all(|r| r.proportion.is_some()));
    }

    #[test]
    fn sample_population_is_deterministic_and_complete() {
        let a = sample_population(42);
        assert_eq!(a, sample_population(42));
        assert_eq!(a.len(), STATE_CODES.len());
        assert!(a.values().all(|&p| p > 0));
    }
}
