use std::hash::Hasher;
use std::sync::Arc;

use anyhow::{Context, Result};
use lifepath_game::{
    LifeSession, Philosopher, QuestionPool, Report, SessionConfig, SessionStatus, TurnOutcome,
    encode_journey_code,
};
use serde::Serialize;
use twox_hash::XxHash64;

use crate::logic::policy::{PlayerPolicy, PlayerStrategy};

/// Declarative plan for running one automated journey.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    /// Pinned philosopher; `None` lets the seed (or its journey code) decide.
    pub philosopher: Option<Philosopher>,
    pub strategy: PlayerStrategy,
    pub config: SessionConfig,
    pub check_replay: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: PlayerStrategy) -> Self {
        Self {
            philosopher: None,
            strategy,
            config: SessionConfig::default(),
            check_replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_philosopher(mut self, philosopher: Philosopher) -> Self {
        self.philosopher = Some(philosopher);
        self
    }

    #[must_use]
    pub const fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.check_replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a journey finishes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    /// # Errors
    ///
    /// Returns the expectation's failure message.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One answered question as seen by the policy.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub age: u32,
    pub question: String,
    pub answered_as: Philosopher,
    pub policy_name: &'static str,
    pub rationale: Option<String>,
}

/// Complete record of an automated journey.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub philosopher: Philosopher,
    pub strategy: PlayerStrategy,
    pub seed: u64,
    pub journey_code: String,
    pub report: Report,
    pub status: SessionStatus,
    pub decisions: Vec<DecisionRecord>,
    pub events: Vec<&'static str>,
    pub fingerprint: u64,
    /// Fingerprint of a second run over the same inputs, when the plan asks for it.
    pub replay_fingerprint: Option<u64>,
}

impl SimulationSummary {
    #[must_use]
    pub fn died(&self) -> bool {
        matches!(self.status, SessionStatus::Dead { .. })
    }
}

/// Headless runner that plays plans against one shared question pool.
#[derive(Clone)]
pub struct JourneySimulator {
    pool: Arc<QuestionPool>,
    verbose: bool,
}

impl JourneySimulator {
    #[must_use]
    pub const fn new(pool: Arc<QuestionPool>, verbose: bool) -> Self {
        Self { pool, verbose }
    }

    /// Play `plan` to the end.
    ///
    /// The plan's pinned philosopher wins; otherwise `declared` (from a journey code),
    /// otherwise one derived from the seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session rejects a policy's answer.
    pub fn run_plan(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        declared: Option<Philosopher>,
    ) -> Result<SimulationSummary> {
        let philosopher = plan
            .philosopher
            .or(declared)
            .unwrap_or_else(|| philosopher_for_seed(seed));
        let (session, decisions) = self.play(plan, philosopher, seed)?;
        let fingerprint = fingerprint_of(&session, &decisions)?;
        let replay_fingerprint = if plan.check_replay {
            let (replayed, replay_decisions) = self.play(plan, philosopher, seed)?;
            Some(fingerprint_of(&replayed, &replay_decisions)?)
        } else {
            None
        };
        let report = session.report().context("finished journey has no report")?;

        if self.verbose {
            println!(
                "  ↳ {} as {} (seed {}): {} choices, final age {}, {}",
                plan.strategy,
                philosopher,
                seed,
                report.choices_made,
                report.final_age,
                report.death_reason.as_deref().unwrap_or("survived")
            );
        }

        Ok(SimulationSummary {
            philosopher,
            strategy: plan.strategy,
            seed,
            journey_code: encode_journey_code(philosopher, seed),
            report,
            status: session.status().clone(),
            events: session.events().to_vec(),
            decisions,
            fingerprint,
            replay_fingerprint,
        })
    }

    fn play(
        &self,
        plan: &SimulationPlan,
        philosopher: Philosopher,
        seed: u64,
    ) -> Result<(LifeSession, Vec<DecisionRecord>)> {
        let mut session = LifeSession::new(Arc::clone(&self.pool), seed, plan.config);
        session
            .select_philosopher(philosopher)
            .context("fresh session refused a philosopher")?;
        let mut policy: Box<dyn PlayerPolicy + Send> = plan.strategy.create_policy(seed);
        let mut decisions = Vec::new();

        while let Some(question) = session.current_question().cloned() {
            let decision = policy.pick_choice(&session, &question);
            decisions.push(DecisionRecord {
                age: session.age(),
                question: question.description.clone(),
                answered_as: decision.philosopher,
                policy_name: policy.name(),
                rationale: decision.rationale,
            });
            let outcome = session
                .choose(decision.philosopher)
                .with_context(|| format!("answer rejected at age {}", session.age()))?;
            log::debug!("{} answered {:?}", policy.name(), outcome);
            if !matches!(outcome, TurnOutcome::Continue) {
                break;
            }
        }
        Ok((session, decisions))
    }
}

/// Philosopher used when neither the plan nor a journey code pins one.
#[must_use]
pub fn philosopher_for_seed(seed: u64) -> Philosopher {
    let idx = usize::try_from(seed % 4).unwrap_or(0);
    Philosopher::ALL[idx]
}

#[derive(Serialize)]
struct Fingerprinted<'a> {
    seed: u64,
    status: &'a SessionStatus,
    choices: &'a [lifepath_game::ChoiceRecord],
    decisions: &'a [DecisionRecord],
}

fn fingerprint_of(session: &LifeSession, decisions: &[DecisionRecord]) -> Result<u64> {
    let payload = serde_json::to_vec(&Fingerprinted {
        seed: session.seed(),
        status: session.status(),
        choices: session.choices(),
        decisions,
    })
    .context("serializing journey fingerprint")?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&payload);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> JourneySimulator {
        JourneySimulator::new(Arc::new(QuestionPool::bundled().unwrap()), false)
    }

    #[test]
    fn devoted_plan_finishes_alive() {
        let plan =
            SimulationPlan::new(PlayerStrategy::Devoted).with_philosopher(Philosopher::Laozi);
        let summary = simulator().run_plan(&plan, 42, None).unwrap();
        assert!(!summary.died());
        assert_eq!(summary.report.adherence_percentage, 100);
        assert_eq!(summary.decisions.len(), summary.report.choices_made);
        assert!(summary.journey_code.starts_with("LZ-"));
    }

    #[test]
    fn declared_philosopher_applies_when_plan_is_open() {
        let plan = SimulationPlan::new(PlayerStrategy::Devoted);
        let summary = simulator()
            .run_plan(&plan, 8, Some(Philosopher::LordShang))
            .unwrap();
        assert_eq!(summary.philosopher, Philosopher::LordShang);

        let open = simulator().run_plan(&plan, 5, None).unwrap();
        assert_eq!(open.philosopher, philosopher_for_seed(5));
    }

    #[test]
    fn certain_death_ends_on_first_stray() {
        let config = SessionConfig {
            death_chance: 1.0,
            ..SessionConfig::default()
        };
        let plan = SimulationPlan::new(PlayerStrategy::Contrarian)
            .with_philosopher(Philosopher::Mozi)
            .with_config(config);
        let summary = simulator().run_plan(&plan, 3, None).unwrap();
        assert!(summary.died());
        assert_eq!(summary.report.choices_made, 1);
        assert!(summary.report.death_reason.is_some());
    }

    #[test]
    fn replay_check_reproduces_fingerprint() {
        let plan = SimulationPlan::new(PlayerStrategy::Wanderer).with_replay_check();
        let summary = simulator().run_plan(&plan, 1234, None).unwrap();
        assert_eq!(summary.replay_fingerprint, Some(summary.fingerprint));
    }

    #[test]
    fn expectations_see_the_summary() {
        let plan = SimulationPlan::new(PlayerStrategy::Devoted).with_expectation(
            |summary: &SimulationSummary| {
                anyhow::ensure!(summary.report.choices_made > 0, "no choices");
                Ok(())
            },
        );
        let summary = simulator().run_plan(&plan, 9, None).unwrap();
        assert!(plan.expectations.iter().all(|e| e.evaluate(&summary).is_ok()));
    }
}
