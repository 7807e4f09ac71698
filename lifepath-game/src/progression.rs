//! Progression engine: which question comes next and how answers move the player along.
//!
//! A journey walks `NeedsEducationChoice -> NeedsFamilyChoice -> InProgress(age) ->
//! Terminated`. The two setup questions assign the path flags; afterwards every
//! question must match the player's age and both flags, and is never repeated.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::{AGE_STEP, FAMILY_SETUP_AGE, FINAL_AGE, FIRST_REGULAR_AGE, START_AGE};
use crate::data::{Question, QuestionPool};
use crate::philosopher::{PathFlag, Philosopher};
use crate::rng::RandomSource;

/// The two setup questions every journey opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStage {
    Education,
    Family,
}

impl SetupStage {
    pub const ALL: [Self; 2] = [Self::Education, Self::Family];

    /// Age the setup question is authored for.
    #[must_use]
    pub const fn age(self) -> u32 {
        match self {
            Self::Education => START_AGE,
            Self::Family => FAMILY_SETUP_AGE,
        }
    }

    /// Whether `question` is this stage's setup question.
    #[must_use]
    pub fn matches(self, question: &Question) -> bool {
        let flag = match self {
            Self::Education => question.education,
            Self::Family => question.family,
        };
        flag == PathFlag::Unset && question.age == self.age()
    }
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Education => write!(f, "education (age {})", self.age()),
            Self::Family => write!(f, "family (age {})", self.age()),
        }
    }
}

/// Pool configuration errors. A pool that raises these cannot start a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("no {stage} setup question in the pool")]
    MissingSetupQuestion { stage: SetupStage },
    #[error("{count} {stage} setup questions in the pool (expected exactly one)")]
    AmbiguousSetupQuestion { stage: SetupStage, count: usize },
}

/// Mutable per-journey player state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub age: u32,
    pub education: PathFlag,
    pub family: PathFlag,
    /// Descriptions already served, the natural key for "don't repeat".
    #[serde(default)]
    pub asked: BTreeSet<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            age: START_AGE,
            education: PathFlag::Unset,
            family: PathFlag::Unset,
            asked: BTreeSet::new(),
        }
    }
}

impl PlayerState {
    /// Both setup questions have been answered.
    #[must_use]
    pub const fn paths_chosen(&self) -> bool {
        self.education.is_set() && self.family.is_set()
    }
}

/// Conceptual position in the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Progress {
    NeedsEducationChoice,
    NeedsFamilyChoice,
    InProgress { age: u32 },
    Terminated,
}

/// State change produced by [`apply_choice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    EducationChosen { flag: PathFlag },
    FamilyChosen { flag: PathFlag },
    Aged { age: u32 },
}

/// Return the unique setup question for `stage`.
///
/// # Errors
///
/// Returns an error if `questions` holds zero or several questions for the stage.
pub fn setup_question(questions: &[Question], stage: SetupStage) -> Result<&Question, SetupError> {
    let mut matches = questions.iter().filter(|q| stage.matches(q));
    let first = matches
        .next()
        .ok_or(SetupError::MissingSetupQuestion { stage })?;
    let extra = matches.count();
    if extra > 0 {
        return Err(SetupError::AmbiguousSetupQuestion {
            stage,
            count: extra + 1,
        });
    }
    Ok(first)
}

fn is_eligible(question: &Question, state: &PlayerState) -> bool {
    !question.is_setup()
        && question.age == state.age
        && question.education == state.education
        && question.family == state.family
        && !state.asked.contains(&question.description)
}

/// Regular questions the player could be served right now, in pool order.
///
/// Read-only: never draws randomness or touches the asked-set.
#[must_use]
pub fn eligible_questions<'a>(pool: &'a QuestionPool, state: &PlayerState) -> Vec<&'a Question> {
    if !state.paths_chosen() {
        return Vec::new();
    }
    pool.iter().filter(|q| is_eligible(q, state)).collect()
}

/// Select the question to serve for `state`.
///
/// Setup stages always yield their unique setup question. Afterwards one eligible
/// question is drawn uniformly from `rng`; `None` signals the end of the journey.
///
/// Setup lookups cannot fail here: `QuestionPool::new` already rejected a pool with a
/// missing or ambiguous setup question.
pub fn current_question<'a, R>(
    pool: &'a QuestionPool,
    state: &PlayerState,
    rng: &mut R,
) -> Option<&'a Question>
where
    R: RandomSource + ?Sized,
{
    if !state.education.is_set() {
        return setup_question(pool.questions(), SetupStage::Education).ok();
    }
    if !state.family.is_set() {
        return setup_question(pool.questions(), SetupStage::Family).ok();
    }

    let eligible = eligible_questions(pool, state);
    if eligible.is_empty() {
        log::debug!(
            "no eligible questions at age {} (education {}, family {})",
            state.age,
            state.education,
            state.family
        );
        return None;
    }
    let pick = eligible[rng.next_index(eligible.len())];
    log::debug!(
        "selected question at age {} from {} candidates: {}",
        state.age,
        eligible.len(),
        pick.description
    );
    Some(pick)
}

/// Advance `state` after an answer tagged with `philosopher`.
pub fn apply_choice(state: &mut PlayerState, philosopher: Philosopher) -> Transition {
    if !state.education.is_set() {
        state.education = PathFlag::from_bool(philosopher.pursues_education());
        state.age = FAMILY_SETUP_AGE;
        return Transition::EducationChosen {
            flag: state.education,
        };
    }
    if !state.family.is_set() {
        state.family = PathFlag::from_bool(philosopher.starts_family());
        state.age = FIRST_REGULAR_AGE;
        return Transition::FamilyChosen { flag: state.family };
    }
    state.age += AGE_STEP;
    Transition::Aged { age: state.age }
}

/// Record `description` as served. Idempotent.
pub fn mark_asked(state: &mut PlayerState, description: &str) {
    if !state.asked.contains(description) {
        state.asked.insert(description.to_string());
    }
}

/// Whether the journey has ended, using the default final age.
#[must_use]
pub fn is_over(pool: &QuestionPool, state: &PlayerState) -> bool {
    is_over_at(pool, state, FINAL_AGE)
}

/// Whether the journey has ended for a configurable final age. Read-only probe.
#[must_use]
pub fn is_over_at(pool: &QuestionPool, state: &PlayerState, final_age: u32) -> bool {
    if state.age > final_age {
        return true;
    }
    state.paths_chosen() && !pool.iter().any(|q| is_eligible(q, state))
}

/// Restore `state` to a fresh journey.
pub fn reset(state: &mut PlayerState) {
    *state = PlayerState::default();
}

/// Owns the player state for one journey over a shared, immutable pool.
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    pool: Arc<QuestionPool>,
    state: PlayerState,
    final_age: u32,
}

impl ProgressionEngine {
    #[must_use]
    pub fn new(pool: Arc<QuestionPool>) -> Self {
        Self::with_final_age(pool, FINAL_AGE)
    }

    #[must_use]
    pub fn with_final_age(pool: Arc<QuestionPool>, final_age: u32) -> Self {
        Self {
            pool,
            state: PlayerState::default(),
            final_age,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    #[must_use]
    pub fn shared_pool(&self) -> Arc<QuestionPool> {
        Arc::clone(&self.pool)
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub const fn age(&self) -> u32 {
        self.state.age
    }

    #[must_use]
    pub const fn final_age(&self) -> u32 {
        self.final_age
    }

    pub fn current_question<R>(&self, rng: &mut R) -> Option<&Question>
    where
        R: RandomSource + ?Sized,
    {
        current_question(&self.pool, &self.state, rng)
    }

    pub fn process_choice(&mut self, philosopher: Philosopher) -> Transition {
        if self.is_game_over() {
            log::warn!(
                "choice {philosopher} applied after the journey ended (age {})",
                self.state.age
            );
        }
        let transition = apply_choice(&mut self.state, philosopher);
        log::debug!("{philosopher} -> {transition:?}");
        transition
    }

    pub fn mark_question_asked(&mut self, description: &str) {
        mark_asked(&mut self.state, description);
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        is_over_at(&self.pool, &self.state, self.final_age)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        if self.is_game_over() {
            Progress::Terminated
        } else if !self.state.education.is_set() {
            Progress::NeedsEducationChoice
        } else if !self.state.family.is_set() {
            Progress::NeedsFamilyChoice
        } else {
            Progress::InProgress {
                age: self.state.age,
            }
        }
    }

    pub fn reset(&mut self) {
        reset(&mut self.state);
    }
}
