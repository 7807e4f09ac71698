//! Session controller: binds the progression engine, the death roll and the choice log.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::constants::{
    LOG_AGED, LOG_COMPLETED, LOG_DEATH_SURVIVED, LOG_DIED, LOG_EDUCATION_NO, LOG_EDUCATION_YES,
    LOG_FAMILY_NO, LOG_FAMILY_YES,
};
use crate::data::{PointTotals, Question, QuestionPool};
use crate::death::{pick_death_reason, roll_for_death_with_chance};
use crate::outcome::{ChoiceRecord, Report, summarize};
use crate::philosopher::{PathFlag, Philosopher};
use crate::progression::{ProgressionEngine, Transition};
use crate::rng::{RandomSource, RngBundle};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SessionStatus {
    ChoosingPhilosopher,
    InProgress,
    Dead { reason: String },
    Complete,
}

impl SessionStatus {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Dead { .. } | Self::Complete)
    }
}

/// Result of answering one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Died { reason: &'static str },
    Completed,
}

/// Caller contract violations. The session state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no philosopher has been selected yet")]
    NoPhilosopherSelected,
    #[error("a philosopher was already selected ({0})")]
    PhilosopherAlreadySelected(Philosopher),
    #[error("the journey is already over")]
    JourneyOver,
    #[error("the current question has no option {0:?}")]
    UnknownOption(String),
}

/// One player's journey over a shared question pool.
#[derive(Debug, Clone)]
pub struct LifeSession {
    engine: ProgressionEngine,
    rng: RngBundle,
    config: SessionConfig,
    initial: Option<Philosopher>,
    status: SessionStatus,
    /// Index into the pool of the question on screen.
    current: Option<usize>,
    order: SmallVec<[Philosopher; 4]>,
    choices: Vec<ChoiceRecord>,
    totals: PointTotals,
    events: Vec<&'static str>,
}

impl LifeSession {
    #[must_use]
    pub fn new(pool: Arc<QuestionPool>, seed: u64, config: SessionConfig) -> Self {
        Self {
            engine: ProgressionEngine::with_final_age(pool, config.final_age),
            rng: RngBundle::from_user_seed(seed),
            config,
            initial: None,
            status: SessionStatus::ChoosingPhilosopher,
            current: None,
            order: SmallVec::new(),
            choices: Vec::new(),
            totals: PointTotals::default(),
            events: Vec::new(),
        }
    }

    /// Declare the player's philosopher and serve the first question.
    ///
    /// # Errors
    ///
    /// Returns an error if a philosopher was already chosen for this journey.
    pub fn select_philosopher(&mut self, philosopher: Philosopher) -> Result<(), SessionError> {
        if let Some(existing) = self.initial {
            return Err(SessionError::PhilosopherAlreadySelected(existing));
        }
        log::debug!("journey {} starts as {philosopher}", self.rng.seed());
        self.initial = Some(philosopher);
        self.status = SessionStatus::InProgress;
        if !self.serve_next() {
            self.complete();
        }
        Ok(())
    }

    /// The question on screen. Repeated reads return the same question.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current
            .and_then(|idx| self.engine.pool().questions().get(idx))
    }

    /// Display order of the current question's options.
    #[must_use]
    pub fn option_order(&self) -> &[Philosopher] {
        &self.order
    }

    /// Answer the current question with `philosopher`'s option.
    ///
    /// # Errors
    ///
    /// Returns an error if no philosopher was selected, the journey is over, or
    /// the current question carries no option for `philosopher`.
    pub fn choose(&mut self, philosopher: Philosopher) -> Result<TurnOutcome, SessionError> {
        let initial = self.initial.ok_or(SessionError::NoPhilosopherSelected)?;
        if self.status.is_finished() {
            log::warn!("choice {philosopher} rejected: journey already over");
            return Err(SessionError::JourneyOver);
        }
        let Some(question) = self.current_question() else {
            log::warn!("choice {philosopher} rejected: no question on screen");
            return Err(SessionError::JourneyOver);
        };
        let Some(option) = question.option(philosopher) else {
            return Err(SessionError::UnknownOption(philosopher.name().to_string()));
        };
        let points = option.points;
        let record = ChoiceRecord {
            philosopher,
            question: question.description.clone(),
            choice: option.text.clone(),
            age: self.engine.age(),
        };
        let description = record.question.clone();
        self.choices.push(record);
        self.totals += points;

        if roll_for_death_with_chance(
            philosopher,
            initial,
            self.config.death_chance,
            self.rng.death(),
        ) {
            let reason = pick_death_reason(self.rng.reason());
            log::debug!("journey ended at age {}: {reason}", self.engine.age());
            self.events.push(LOG_DIED);
            self.status = SessionStatus::Dead {
                reason: reason.to_string(),
            };
            self.clear_current();
            return Ok(TurnOutcome::Died { reason });
        }
        if philosopher != initial {
            self.events.push(LOG_DEATH_SURVIVED);
        }

        self.engine.mark_question_asked(&description);
        let transition = self.engine.process_choice(philosopher);
        self.events.push(transition_key(transition));

        if self.engine.is_game_over() || !self.serve_next() {
            self.complete();
            return Ok(TurnOutcome::Completed);
        }
        Ok(TurnOutcome::Continue)
    }

    /// Answer the current question by option text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text matches no option, or as [`Self::choose`].
    pub fn choose_text(&mut self, text: &str) -> Result<TurnOutcome, SessionError> {
        if self.initial.is_none() {
            return Err(SessionError::NoPhilosopherSelected);
        }
        if self.status.is_finished() {
            return Err(SessionError::JourneyOver);
        }
        let philosopher = self
            .current_question()
            .and_then(|q| q.option_by_text(text))
            .map(|o| o.philosopher)
            .ok_or_else(|| SessionError::UnknownOption(text.to_string()))?;
        self.choose(philosopher)
    }

    /// Start over on the same pool. RNG streams continue where they were.
    pub fn restart(&mut self) {
        self.engine.reset();
        self.initial = None;
        self.status = SessionStatus::ChoosingPhilosopher;
        self.clear_current();
        self.choices.clear();
        self.totals = PointTotals::default();
        self.events.clear();
    }

    /// Start over and reseed every stream, replaying `seed` from scratch.
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.restart();
        self.rng = RngBundle::from_user_seed(seed);
    }

    /// Aggregate the journey so far.
    ///
    /// # Errors
    ///
    /// Returns an error if no philosopher has been selected.
    pub fn report(&self) -> Result<Report, SessionError> {
        let initial = self.initial.ok_or(SessionError::NoPhilosopherSelected)?;
        let death_reason = match &self.status {
            SessionStatus::Dead { reason } => Some(reason.as_str()),
            _ => None,
        };
        Ok(summarize(
            &self.choices,
            initial,
            self.totals,
            death_reason,
            self.engine.age(),
        ))
    }

    #[must_use]
    pub const fn initial_philosopher(&self) -> Option<Philosopher> {
        self.initial
    }

    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    #[must_use]
    pub fn choices(&self) -> &[ChoiceRecord] {
        &self.choices
    }

    #[must_use]
    pub const fn totals(&self) -> PointTotals {
        self.totals
    }

    #[must_use]
    pub const fn age(&self) -> u32 {
        self.engine.age()
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Translation keys for the notable events so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[&'static str] {
        &self.events
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    fn serve_next(&mut self) -> bool {
        let Some(question) = self.engine.current_question(self.rng.selection()) else {
            self.clear_current();
            return false;
        };
        let description = question.description.clone();
        self.current = self
            .engine
            .pool()
            .iter()
            .position(|q| q.description == description);
        self.order = Philosopher::ALL.into_iter().collect();
        if self.config.shuffle_options {
            shuffle(&mut self.order, self.rng.shuffle());
        }
        self.current.is_some()
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.order.clear();
    }

    fn complete(&mut self) {
        log::debug!("journey completed at age {}", self.engine.age());
        self.events.push(LOG_COMPLETED);
        self.status = SessionStatus::Complete;
        self.clear_current();
    }
}

const fn transition_key(transition: Transition) -> &'static str {
    match transition {
        Transition::EducationChosen {
            flag: PathFlag::Yes,
        } => LOG_EDUCATION_YES,
        Transition::EducationChosen { .. } => LOG_EDUCATION_NO,
        Transition::FamilyChosen {
            flag: PathFlag::Yes,
        } => LOG_FAMILY_YES,
        Transition::FamilyChosen { .. } => LOG_FAMILY_NO,
        Transition::Aged { .. } => LOG_AGED,
    }
}

fn shuffle<R: RandomSource + ?Sized>(items: &mut [Philosopher], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{question, setup_pair};

    fn small_pool() -> Arc<QuestionPool> {
        let mut questions = setup_pair();
        questions.extend([
            question(30, "work yes-yes", PathFlag::Yes, PathFlag::Yes),
            question(40, "rest yes-yes", PathFlag::Yes, PathFlag::Yes),
            question(30, "work no-no", PathFlag::No, PathFlag::No),
        ]);
        Arc::new(QuestionPool::new(questions).unwrap())
    }

    fn safe_config() -> SessionConfig {
        SessionConfig {
            death_chance: 0.0,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn choosing_before_selection_is_rejected() {
        let mut session = LifeSession::new(small_pool(), 1, SessionConfig::default());
        assert_eq!(*session.status(), SessionStatus::ChoosingPhilosopher);
        assert!(session.current_question().is_none());
        assert_eq!(
            session.choose(Philosopher::Kongzi),
            Err(SessionError::NoPhilosopherSelected)
        );
        assert_eq!(
            session.report().unwrap_err(),
            SessionError::NoPhilosopherSelected
        );
    }

    #[test]
    fn devoted_journey_runs_to_completion() {
        let mut session = LifeSession::new(small_pool(), 7, SessionConfig::default());
        session.select_philosopher(Philosopher::Kongzi).unwrap();
        assert_eq!(
            session.select_philosopher(Philosopher::Laozi),
            Err(SessionError::PhilosopherAlreadySelected(Philosopher::Kongzi))
        );
        assert_eq!(session.current_question().unwrap().description, "college?");

        let mut outcomes = Vec::new();
        while !session.is_finished() {
            outcomes.push(session.choose(Philosopher::Kongzi).unwrap());
        }
        assert_eq!(
            outcomes,
            vec![
                TurnOutcome::Continue,
                TurnOutcome::Continue,
                TurnOutcome::Continue,
                TurnOutcome::Completed,
            ]
        );
        assert_eq!(session.choices().len(), 4);
        assert_eq!(session.age(), 50);
        assert_eq!(session.rng().death_draws(), 0);
        assert_eq!(
            session.events(),
            &[
                LOG_EDUCATION_YES,
                LOG_FAMILY_YES,
                LOG_AGED,
                LOG_AGED,
                LOG_COMPLETED
            ]
        );
        assert_eq!(session.choose(Philosopher::Kongzi), Err(SessionError::JourneyOver));

        let report = session.report().unwrap();
        assert_eq!(report.adherence_percentage, 100);
        assert_eq!(report.total_points, 4);
        assert!(!report.is_dead);
    }

    #[test]
    fn mismatch_below_threshold_dies_with_single_record() {
        let config = SessionConfig {
            death_chance: 1.0,
            ..SessionConfig::default()
        };
        let mut session = LifeSession::new(small_pool(), 3, config);
        session.select_philosopher(Philosopher::Laozi).unwrap();
        let outcome = session.choose(Philosopher::Kongzi).unwrap();
        let TurnOutcome::Died { reason } = outcome else {
            panic!("expected death, got {outcome:?}");
        };
        assert!(crate::death::DEATH_REASONS.contains(&reason));
        assert_eq!(session.choices().len(), 1);
        assert!(session.current_question().is_none());
        assert_eq!(session.events(), &[LOG_DIED]);

        let report = session.report().unwrap();
        assert!(report.is_dead);
        assert_eq!(report.death_reason.as_deref(), Some(reason));
        assert_eq!(report.adherence_count, 0);
        assert_eq!(report.primary, Some(Philosopher::Kongzi));
    }

    #[test]
    fn path_follows_the_answers_not_the_declaration() {
        let mut session = LifeSession::new(small_pool(), 11, safe_config());
        session.select_philosopher(Philosopher::Kongzi).unwrap();
        session.choose(Philosopher::LordShang).unwrap();
        session.choose(Philosopher::LordShang).unwrap();
        assert_eq!(session.current_question().unwrap().description, "work no-no");
        assert_eq!(
            session.choose(Philosopher::LordShang).unwrap(),
            TurnOutcome::Completed
        );
        assert_eq!(
            session.events(),
            &[
                LOG_DEATH_SURVIVED,
                LOG_EDUCATION_NO,
                LOG_DEATH_SURVIVED,
                LOG_FAMILY_NO,
                LOG_DEATH_SURVIVED,
                LOG_AGED,
                LOG_COMPLETED
            ]
        );
    }

    #[test]
    fn choose_text_matches_option_text() {
        let mut session = LifeSession::new(small_pool(), 5, safe_config());
        assert_eq!(
            session.choose_text("anything"),
            Err(SessionError::NoPhilosopherSelected)
        );
        session.select_philosopher(Philosopher::Mozi).unwrap();
        let text = session
            .current_question()
            .and_then(|q| q.option(Philosopher::Mozi))
            .map(|o| o.text.clone())
            .unwrap();
        assert_eq!(session.choose_text(&text), Ok(TurnOutcome::Continue));
        assert_eq!(session.choices()[0].choice, text);
        assert!(matches!(
            session.choose_text("no such answer"),
            Err(SessionError::UnknownOption(_))
        ));
    }

    #[test]
    fn current_question_is_stable_between_reads() {
        let mut session = LifeSession::new(small_pool(), 9, safe_config());
        session.select_philosopher(Philosopher::Kongzi).unwrap();
        session.choose(Philosopher::Kongzi).unwrap();
        session.choose(Philosopher::Kongzi).unwrap();
        let draws = session.rng().selection_draws();
        let first = session.current_question().map(|q| q.description.clone());
        let second = session.current_question().map(|q| q.description.clone());
        assert_eq!(first, second);
        assert_eq!(session.rng().selection_draws(), draws);
    }

    #[test]
    fn option_order_is_a_permutation() {
        let mut session = LifeSession::new(small_pool(), 21, SessionConfig::default());
        session.select_philosopher(Philosopher::Laozi).unwrap();
        let mut order = session.option_order().to_vec();
        order.sort();
        assert_eq!(order, Philosopher::ALL.to_vec());

        let unshuffled = SessionConfig {
            shuffle_options: false,
            ..SessionConfig::default()
        };
        let mut session = LifeSession::new(small_pool(), 21, unshuffled);
        session.select_philosopher(Philosopher::Laozi).unwrap();
        assert_eq!(session.option_order(), &Philosopher::ALL);
    }

    #[test]
    fn restart_keeps_pool_and_clears_journey() {
        let pool = small_pool();
        let mut session = LifeSession::new(Arc::clone(&pool), 2, safe_config());
        session.select_philosopher(Philosopher::Mozi).unwrap();
        session.choose(Philosopher::Mozi).unwrap();
        session.restart();
        assert_eq!(*session.status(), SessionStatus::ChoosingPhilosopher);
        assert!(session.choices().is_empty());
        assert!(session.events().is_empty());
        assert_eq!(session.totals(), PointTotals::default());
        assert_eq!(session.age(), 10);
        assert_eq!(session.engine().pool().len(), pool.len());

        session.restart_with_seed(77);
        assert_eq!(session.seed(), 77);
        assert_eq!(session.rng().total_draws(), 0);
    }

    #[test]
    fn same_seed_and_answers_replay_identically() {
        let run = |seed| {
            let mut session = LifeSession::new(small_pool(), seed, SessionConfig::default());
            session.select_philosopher(Philosopher::Kongzi).unwrap();
            while !session.is_finished() {
                let pick = session.option_order()[0];
                session.choose(pick).unwrap();
            }
            (session.choices().to_vec(), session.status().clone())
        };
        assert_eq!(run(1234), run(1234));
    }
}
