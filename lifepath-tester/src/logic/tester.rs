use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{JourneySimulator, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub runs: Vec<RunRecord>,
}

/// Flat per-journey record, one row of the CSV report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario: String,
    pub iteration: usize,
    pub seed: u64,
    pub journey_code: String,
    pub philosopher: String,
    pub strategy: String,
    pub choices: usize,
    pub adherence_percentage: i32,
    pub primary: String,
    pub total_points: i32,
    pub final_age: u32,
    pub died: bool,
    pub death_reason: String,
    pub passed: bool,
}

impl RunRecord {
    fn from_summary(
        scenario: &str,
        iteration: usize,
        summary: &SimulationSummary,
        passed: bool,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            iteration,
            seed: summary.seed,
            journey_code: summary.journey_code.clone(),
            philosopher: summary.philosopher.name().to_string(),
            strategy: summary.strategy.label().to_string(),
            choices: summary.report.choices_made,
            adherence_percentage: summary.report.adherence_percentage,
            primary: summary.report.primary_name().to_string(),
            total_points: summary.report.total_points,
            final_age: summary.report.final_age,
            died: summary.died(),
            death_reason: summary.report.death_reason.clone().unwrap_or_default(),
            passed,
        }
    }
}

pub struct LogicTester {
    simulator: JourneySimulator,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(simulator: JourneySimulator, verbose: bool) -> Self {
        Self { simulator, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed.label()
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let outcome =
            self.run_simulation_iterations(&scenario.name, &scenario.plan, seed, iterations);

        let average_duration = if outcome.performance_data.is_empty() {
            Duration::ZERO
        } else {
            outcome.performance_data.iter().sum::<Duration>()
                / u32::try_from(outcome.performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed: seed.label(),
            passed: outcome.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: outcome.successes,
            failures: outcome.failures,
            average_duration,
            performance_data: outcome.performance_data,
            runs: outcome.runs,
        }
    }

    fn run_simulation_iterations(
        &self,
        name: &str,
        plan: &SimulationPlan,
        seed: &SeedInfo,
        iterations: usize,
    ) -> IterationOutcome {
        let mut outcome = IterationOutcome::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed
                .seed
                .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match self.simulator.run_plan(plan, iteration_seed, seed.philosopher) {
                Ok(summary) => summary,
                Err(err) => {
                    outcome
                        .failures
                        .push(format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1));
                    continue;
                }
            };

            if let Some(err) = evaluate_expectations(plan, &summary) {
                outcome.failures.push(format!(
                    "Iteration {} ({} as {}, code {}, {} choices, age {}): {} | {}",
                    i + 1,
                    summary.strategy,
                    summary.philosopher,
                    summary.journey_code,
                    summary.report.choices_made,
                    summary.report.final_age,
                    err,
                    summarize_decision_path(&summary)
                ));
                outcome
                    .runs
                    .push(RunRecord::from_summary(name, i + 1, &summary, false));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                }
            } else {
                outcome.successes += 1;
                let duration = start_time.elapsed();
                outcome.performance_data.push(duration);
                outcome
                    .runs
                    .push(RunRecord::from_summary(name, i + 1, &summary, true));

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) code:{} adherence:{}%",
                        i + 1,
                        iterations,
                        summary.journey_code,
                        summary.report.adherence_percentage
                    );
                }
            }
        }

        outcome
    }
}

#[derive(Default)]
struct IterationOutcome {
    successes: usize,
    failures: Vec<String>,
    performance_data: Vec<Duration>,
    runs: Vec<RunRecord>,
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| err.to_string())
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }

    summary
        .decisions
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            let rationale = entry
                .rationale
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            format!(
                "age {} ({}): {} via {} [{}]",
                entry.age, entry.question, entry.answered_as, entry.policy_name, rationale
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis_vec.into_iter().map(Duration::from_millis).collect())
    }
}
