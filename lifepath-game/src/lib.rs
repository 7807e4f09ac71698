//! Lifepath Game Engine
//!
//! Platform-agnostic core logic for Lifepath, a philosophical life-choices journey.
//! The player declares one of four classical Chinese schools of thought and then
//! answers age-gated questions; straying from the declared school risks an early end.
//! This crate provides all game rules without UI or platform-specific dependencies.

use std::sync::{Arc, OnceLock};
use thiserror::Error;

pub mod config;
pub mod constants;
pub mod data;
pub mod death;
pub mod loader;
pub mod numbers;
pub mod outcome;
pub mod philosopher;
pub mod progression;
pub mod rng;
pub mod seed;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, SessionConfig};
pub use data::{
    ChoiceOption, DataError, PointTotals, Points, Question, QuestionPool, RawRow, parse_csv,
    parse_rows,
};
pub use death::{DEATH_REASONS, pick_death_reason, roll_for_death, roll_for_death_with_chance};
#[cfg(feature = "async")]
pub use loader::load_pool_from_path_async;
pub use loader::{DataLoader, FileLoader, StaticLoader, load_pool};
pub use outcome::{AdherenceTier, AlignmentShare, ChoiceRecord, Report, summarize};
pub use philosopher::{PathFlag, Philosopher, PhilosopherProfile, UnknownPhilosopher};
pub use progression::{
    PlayerState, Progress, ProgressionEngine, SetupError, SetupStage, Transition,
};
pub use rng::{CountingRng, RandomSource, RngBundle, ScriptedSource};
pub use seed::{decode_journey_code, encode_journey_code, generate_code_from_entropy};
pub use session::{LifeSession, SessionError, SessionStatus, TurnOutcome};

/// Everything that can stop a question pool from loading.
#[derive(Debug, Error)]
pub enum LoadError<E> {
    #[error("question data source unavailable: {0}")]
    DataSourceUnavailable(#[source] E),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Main game engine: loads the pool once and hands out sessions over it.
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
    pool: OnceLock<Arc<QuestionPool>>,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine over the provided data loader.
    pub const fn new(data_loader: L) -> Self {
        Self {
            data_loader,
            pool: OnceLock::new(),
        }
    }

    /// The validated pool, loaded on first use and shared afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the first load fails. A failed load is not cached.
    pub fn pool(&self) -> Result<Arc<QuestionPool>, LoadError<L::Error>> {
        if let Some(pool) = self.pool.get() {
            return Ok(Arc::clone(pool));
        }
        let loaded = Arc::new(load_pool(&self.data_loader)?);
        Ok(Arc::clone(self.pool.get_or_init(|| loaded)))
    }

    /// Whether the pool has been loaded yet.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Start a new journey session with the given seed and tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the question pool cannot be loaded.
    pub fn create_session(
        &self,
        seed: u64,
        config: SessionConfig,
    ) -> Result<LifeSession, LoadError<L::Error>> {
        Ok(LifeSession::new(self.pool()?, seed, config))
    }

    /// Start a session from a journey code, with its philosopher already declared.
    ///
    /// Returns `Ok(None)` when the code is not a valid journey code.
    ///
    /// # Errors
    ///
    /// Returns an error if the question pool cannot be loaded.
    pub fn create_session_from_code(
        &self,
        code: &str,
        config: SessionConfig,
    ) -> Result<Option<LifeSession>, LoadError<L::Error>> {
        let Some((philosopher, seed)) = decode_journey_code(code) else {
            return Ok(None);
        };
        let mut session = self.create_session(seed, config)?;
        if let Err(err) = session.select_philosopher(philosopher) {
            log::warn!("fresh session refused {philosopher}: {err}");
            return Ok(None);
        }
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CountingLoader {
        loads: Rc<Cell<usize>>,
    }

    impl DataLoader for CountingLoader {
        type Error = Infallible;

        fn load_table(&self) -> Result<String, Self::Error> {
            self.loads.set(self.loads.get() + 1);
            StaticLoader::bundled().load_table()
        }
    }

    #[derive(Debug, Error)]
    #[error("offline")]
    struct Offline;

    struct OfflineLoader;

    impl DataLoader for OfflineLoader {
        type Error = Offline;

        fn load_table(&self) -> Result<String, Self::Error> {
            Err(Offline)
        }
    }

    #[test]
    fn engine_loads_pool_once_and_shares_it() {
        let loader = CountingLoader::default();
        let engine = GameEngine::new(loader.clone());
        assert!(!engine.is_loaded());
        let a = engine.create_session(1, SessionConfig::default()).unwrap();
        let b = engine.create_session(2, SessionConfig::default()).unwrap();
        assert!(engine.is_loaded());
        assert_eq!(loader.loads.get(), 1);
        assert!(Arc::ptr_eq(
            &a.engine().shared_pool(),
            &b.engine().shared_pool()
        ));
    }

    #[test]
    fn failed_load_is_fatal_and_not_cached() {
        let engine = GameEngine::new(OfflineLoader);
        let err = engine
            .create_session(1, SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::DataSourceUnavailable(Offline)));
        assert_eq!(err.to_string(), "question data source unavailable: offline");
        assert!(!engine.is_loaded());
    }

    #[test]
    fn journey_code_declares_philosopher() {
        let engine = GameEngine::new(StaticLoader::bundled());
        let session = engine
            .create_session_from_code("MZ-LOTUS42", SessionConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(session.initial_philosopher(), Some(Philosopher::Mozi));
        assert!(session.current_question().is_some());
        assert!(
            engine
                .create_session_from_code("nonsense", SessionConfig::default())
                .unwrap()
                .is_none()
        );
    }
}
