pub mod catalog;

use lifepath_game::SessionConfig;

use crate::logic::SimulationPlan;

/// Named automated journey with its plan and expectations.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Resolve a scenario key to the scenarios it runs, tuned by `config`.
///
/// `all` is expanded by the caller; `full-coverage` yields one scenario per
/// philosopher and strategy.
pub fn get_scenario(name: &str, config: SessionConfig) -> Option<Vec<TestScenario>> {
    let scenarios = match name.to_lowercase().as_str() {
        "smoke" => vec![catalog::smoke_scenario()],
        "devoted-survives" | "devoted" => vec![catalog::devoted_survives_scenario()],
        "contrarian-risk" | "contrarian" => vec![catalog::contrarian_risk_scenario()],
        "replay-determinism" | "replay" => vec![catalog::replay_determinism_scenario()],
        "full-coverage" | "coverage" => catalog::full_coverage_scenarios(),
        _ => return None,
    };
    Some(
        scenarios
            .into_iter()
            .map(|mut scenario| {
                scenario.plan.config = config;
                scenario
            })
            .collect(),
    )
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("devoted-survives", "Devoted Journeys Never Roll for Death"),
        ("contrarian-risk", "Contrarian Journeys Face the Death Roll"),
        ("replay-determinism", "Same Seed Replays the Same Journey"),
        (
            "full-coverage",
            "Every Philosopher with Every Answering Strategy",
        ),
        ("all", "Every scenario above"),
    ]
}

/// Every concrete scenario key, in the order `all` runs them.
pub const ALL_SCENARIO_KEYS: [&str; 5] = [
    "smoke",
    "devoted-survives",
    "contrarian-risk",
    "replay-determinism",
    "full-coverage",
];
