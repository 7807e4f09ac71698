use anyhow::{Result, ensure};
use lifepath_game::constants::LOG_DEATH_SURVIVED;
use lifepath_game::{DEATH_REASONS, Philosopher, SessionStatus, decode_journey_code};

use super::TestScenario;
use crate::logic::{PlayerStrategy, SimulationPlan, SimulationSummary};

pub fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Test",
        SimulationPlan::new(PlayerStrategy::Devoted).with_expectation(smoke_expectation),
    )
}

pub fn devoted_survives_scenario() -> TestScenario {
    TestScenario::simulation(
        "Devoted Journeys Never Roll for Death",
        SimulationPlan::new(PlayerStrategy::Devoted).with_expectation(devoted_expectation),
    )
}

pub fn contrarian_risk_scenario() -> TestScenario {
    TestScenario::simulation(
        "Contrarian Journeys Face the Death Roll",
        SimulationPlan::new(PlayerStrategy::Contrarian).with_expectation(contrarian_expectation),
    )
}

pub fn replay_determinism_scenario() -> TestScenario {
    TestScenario::simulation(
        "Same Seed Replays the Same Journey",
        SimulationPlan::new(PlayerStrategy::Wanderer)
            .with_replay_check()
            .with_expectation(replay_expectation),
    )
}

pub fn full_coverage_scenarios() -> Vec<TestScenario> {
    Philosopher::ALL
        .into_iter()
        .flat_map(|philosopher| {
            PlayerStrategy::ALL.into_iter().map(move |strategy| {
                TestScenario::simulation(
                    format!("Full Coverage - {philosopher} / {strategy}"),
                    SimulationPlan::new(strategy)
                        .with_philosopher(philosopher)
                        .with_expectation(journey_invariants),
                )
            })
        })
        .collect()
}

/// Bookkeeping every finished journey must satisfy, whatever the answers were.
pub fn journey_invariants(summary: &SimulationSummary) -> Result<()> {
    let report = &summary.report;
    ensure!(
        summary.status.is_finished(),
        "journey stopped before finishing: {:?}",
        summary.status
    );
    ensure!(
        report.choices_made == summary.decisions.len(),
        "report counts {} choices but {} decisions were made",
        report.choices_made,
        summary.decisions.len()
    );
    let tallied: usize = report.counts.iter().map(|&(_, n)| n).sum();
    ensure!(
        tallied == report.choices_made,
        "affinity counts sum to {tallied}, expected {}",
        report.choices_made
    );
    ensure!(
        report.adherence_count == report.count_for(summary.philosopher),
        "adherence {} disagrees with the {} tally",
        report.adherence_count,
        summary.philosopher
    );
    ensure!(
        (0..=100).contains(&report.adherence_percentage),
        "adherence {}% out of range",
        report.adherence_percentage
    );
    ensure!(
        report.is_dead == summary.died(),
        "report death flag disagrees with status"
    );
    match (&summary.status, report.death_reason.as_deref()) {
        (SessionStatus::Dead { reason }, Some(reported)) => {
            ensure!(reason == reported, "death reason changed in the report");
            ensure!(
                DEATH_REASONS.contains(&reported),
                "unknown death reason: {reported}"
            );
        }
        (SessionStatus::Complete, None) => {}
        (status, reason) => anyhow::bail!("status {status:?} with death reason {reason:?}"),
    }
    let ages: Vec<u32> = summary.decisions.iter().map(|d| d.age).collect();
    ensure!(
        ages.windows(2).all(|pair| pair[0] < pair[1]),
        "ages did not strictly increase: {ages:?}"
    );
    Ok(())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    journey_invariants(summary)?;
    ensure!(
        summary.report.choices_made > 0,
        "journey should answer at least one question"
    );
    ensure!(!summary.died(), "a devoted journey died");
    Ok(())
}

fn devoted_expectation(summary: &SimulationSummary) -> Result<()> {
    journey_invariants(summary)?;
    let report = &summary.report;
    ensure!(
        summary.status == SessionStatus::Complete,
        "devoted journey ended as {:?}",
        summary.status
    );
    ensure!(
        report.adherence_percentage == 100,
        "devoted adherence was {}%",
        report.adherence_percentage
    );
    ensure!(
        report.primary == Some(summary.philosopher) && !report.drifted(),
        "devoted journey drifted to {}",
        report.primary_name()
    );
    ensure!(
        !summary.events.contains(&LOG_DEATH_SURVIVED),
        "a devoted answer triggered a death roll"
    );
    Ok(())
}

fn contrarian_expectation(summary: &SimulationSummary) -> Result<()> {
    journey_invariants(summary)?;
    let report = &summary.report;
    ensure!(
        report.adherence_count == 0,
        "contrarian answered as {} {} times",
        summary.philosopher,
        report.adherence_count
    );
    let survived_rolls = summary
        .events
        .iter()
        .filter(|&&key| key == LOG_DEATH_SURVIVED)
        .count();
    let expected = if summary.died() {
        report.choices_made - 1
    } else {
        report.choices_made
    };
    ensure!(
        survived_rolls == expected,
        "{survived_rolls} survived rolls for {} answers",
        report.choices_made
    );
    Ok(())
}

fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    journey_invariants(summary)?;
    ensure!(
        summary.replay_fingerprint == Some(summary.fingerprint),
        "replay fingerprint {:?} differs from {}",
        summary.replay_fingerprint,
        summary.fingerprint
    );
    let decoded = decode_journey_code(&summary.journey_code).map(|(p, _)| p);
    ensure!(
        decoded == Some(summary.philosopher),
        "journey code {} does not name {}",
        summary.journey_code,
        summary.philosopher
    );
    Ok(())
}
