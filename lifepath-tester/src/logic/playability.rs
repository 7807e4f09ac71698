//! Per philosopher and strategy roll-ups across every automated journey.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::logic::tester::{RunRecord, ScenarioResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayabilityAggregate {
    pub philosopher: String,
    pub strategy: String,
    pub journeys: usize,
    pub deaths: usize,
    pub survival_pct: f64,
    pub mean_choices: f64,
    pub mean_adherence: f64,
    pub mean_points: f64,
    pub mean_final_age: f64,
    /// Share of journeys whose most-chosen philosopher differs from the declared one.
    pub drift_pct: f64,
}

#[derive(Default)]
struct Accumulator {
    journeys: usize,
    deaths: usize,
    choices: usize,
    adherence: i64,
    points: i64,
    final_age: u64,
    drifted: usize,
}

impl Accumulator {
    fn push(&mut self, run: &RunRecord) {
        self.journeys += 1;
        self.deaths += usize::from(run.died);
        self.choices += run.choices;
        self.adherence += i64::from(run.adherence_percentage);
        self.points += i64::from(run.total_points);
        self.final_age += u64::from(run.final_age);
        self.drifted += usize::from(run.primary != run.philosopher);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, philosopher: String, strategy: String) -> PlayabilityAggregate {
        let n = self.journeys.max(1) as f64;
        PlayabilityAggregate {
            philosopher,
            strategy,
            journeys: self.journeys,
            deaths: self.deaths,
            survival_pct: (self.journeys - self.deaths) as f64 / n * 100.0,
            mean_choices: self.choices as f64 / n,
            mean_adherence: self.adherence as f64 / n,
            mean_points: self.points as f64 / n,
            mean_final_age: self.final_age as f64 / n,
            drift_pct: self.drifted as f64 / n * 100.0,
        }
    }
}

/// Group every run in `results` by philosopher and strategy.
#[must_use]
pub fn aggregate_runs(results: &[ScenarioResult]) -> Vec<PlayabilityAggregate> {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    for run in results.iter().flat_map(|result| &result.runs) {
        groups
            .entry((run.philosopher.clone(), run.strategy.clone()))
            .or_default()
            .push(run);
    }
    groups
        .into_iter()
        .map(|((philosopher, strategy), acc)| acc.finish(philosopher, strategy))
        .collect()
}
