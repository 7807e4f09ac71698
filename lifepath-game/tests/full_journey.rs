use std::sync::Arc;

use lifepath_game::progression::{self, PlayerState};
use lifepath_game::{
    ChoiceRecord, LifeSession, PathFlag, Philosopher, QuestionPool, ScriptedSource,
    SessionConfig, SessionStatus, TurnOutcome, pick_death_reason, roll_for_death, summarize,
};

fn bundled() -> Arc<QuestionPool> {
    Arc::new(QuestionPool::bundled().unwrap())
}

#[test]
fn devoted_players_reach_old_age() {
    let pool = bundled();
    for philosopher in Philosopher::ALL {
        for seed in [1_u64, 42, 0xDEAD_BEEF] {
            let mut session = LifeSession::new(Arc::clone(&pool), seed, SessionConfig::default());
            session.select_philosopher(philosopher).unwrap();
            let mut last = TurnOutcome::Continue;
            while !session.is_finished() {
                last = session.choose(philosopher).unwrap();
            }
            assert_eq!(last, TurnOutcome::Completed, "{philosopher} seed {seed}");
            assert_eq!(*session.status(), SessionStatus::Complete);
            assert_eq!(session.age(), 100, "{philosopher} should outlive ninety");
            assert_eq!(session.choices().len(), 9);

            let report = session.report().unwrap();
            assert_eq!(report.adherence_percentage, 100);
            assert_eq!(report.primary, Some(philosopher));
            assert!(!report.is_dead);
        }
    }
}

#[test]
fn every_answer_is_served_at_its_own_age() {
    let mut session = LifeSession::new(bundled(), 8, SessionConfig::default());
    session.select_philosopher(Philosopher::Laozi).unwrap();
    while !session.is_finished() {
        let age = session.age();
        assert_eq!(session.current_question().unwrap().age(), age);
        session.choose(Philosopher::Laozi).unwrap();
    }
    let ages: Vec<u32> = session.choices().iter().map(|c| c.age).collect();
    assert_eq!(ages, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
}

#[test]
fn straying_answers_reroute_the_path() {
    let pool = bundled();
    let mut state = PlayerState::default();
    let mut rng = ScriptedSource::constant(0.0);

    let first = progression::current_question(&pool, &state, &mut rng).unwrap();
    assert_eq!(first.age(), 10);
    progression::mark_asked(&mut state, &first.description);
    progression::apply_choice(&mut state, Philosopher::LordShang);
    assert_eq!(state.education, PathFlag::No);

    let second = progression::current_question(&pool, &state, &mut rng).unwrap();
    assert_eq!(second.age(), 20);
    progression::mark_asked(&mut state, &second.description);
    progression::apply_choice(&mut state, Philosopher::Kongzi);
    assert_eq!(state.family, PathFlag::Yes);
    assert_eq!(state.age, 30);

    let third = progression::current_question(&pool, &state, &mut rng).unwrap();
    assert_eq!(third.education, PathFlag::No);
    assert_eq!(third.family, PathFlag::Yes);
    assert_eq!(rng.draws(), 1);
}

#[test]
fn laozi_answering_as_kongzi_dies_on_a_low_draw() {
    let pool = bundled();
    let initial = Philosopher::Laozi;
    let state = PlayerState::default();
    let mut rng = ScriptedSource::constant(0.05);
    let mut log = Vec::new();

    let question = progression::current_question(&pool, &state, &mut rng).unwrap();
    let option = question.option(Philosopher::Kongzi).unwrap();
    log.push(ChoiceRecord {
        philosopher: Philosopher::Kongzi,
        question: question.description.clone(),
        choice: option.text.clone(),
        age: state.age,
    });
    assert!(roll_for_death(Philosopher::Kongzi, initial, &mut rng));
    let reason = pick_death_reason(&mut rng);

    let report = summarize(&log, initial, option.points, Some(reason), state.age);
    assert_eq!(log.len(), 1);
    assert!(report.is_dead);
    assert_eq!(report.adherence_count, 0);
    assert_eq!(report.adherence_percentage, 0);
    assert_eq!(report.primary, Some(Philosopher::Kongzi));

    // The fatal answer never advances the state.
    assert_eq!(state, PlayerState::default());
}

#[test]
fn matching_answers_never_consume_death_draws() {
    let mut rng = ScriptedSource::constant(0.0);
    for philosopher in Philosopher::ALL {
        assert!(!roll_for_death(philosopher, philosopher, &mut rng));
    }
    assert_eq!(rng.draws(), 0);
}

#[test]
fn certain_death_config_ends_on_the_first_stray() {
    let config = SessionConfig {
        death_chance: 1.0,
        ..SessionConfig::default()
    };
    let mut session = LifeSession::new(bundled(), 5, config);
    session.select_philosopher(Philosopher::Mozi).unwrap();
    assert_eq!(
        session.choose(Philosopher::Mozi).unwrap(),
        TurnOutcome::Continue
    );
    let outcome = session.choose(Philosopher::Laozi).unwrap();
    assert!(matches!(outcome, TurnOutcome::Died { .. }));
    assert_eq!(session.choices().len(), 2);
    assert_eq!(session.age(), 20);
    let report = session.report().unwrap();
    assert_eq!(report.adherence_percentage, 50);
    assert_eq!(report.final_age, 20);
}

#[test]
fn restart_replays_on_the_same_pool() {
    let mut session = LifeSession::new(bundled(), 99, SessionConfig::default());
    session.select_philosopher(Philosopher::Kongzi).unwrap();
    session.choose(Philosopher::Kongzi).unwrap();
    session.restart();
    assert_eq!(*session.status(), SessionStatus::ChoosingPhilosopher);
    session.select_philosopher(Philosopher::LordShang).unwrap();
    assert_eq!(session.current_question().unwrap().age(), 10);
    assert_eq!(session.initial_philosopher(), Some(Philosopher::LordShang));
}
