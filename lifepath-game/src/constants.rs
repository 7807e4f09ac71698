//! Centralized progression and tuning constants for Lifepath game logic.
//!
//! The age ladder and the setup-stage ages are structural: the bundled
//! question table is authored against them, so they live in code rather
//! than in the JSON rules document.

// Session event keys ------------------------------------------------------
pub const LOG_EDUCATION_YES: &str = "log.path.education.yes";
pub const LOG_EDUCATION_NO: &str = "log.path.education.no";
pub const LOG_FAMILY_YES: &str = "log.path.family.yes";
pub const LOG_FAMILY_NO: &str = "log.path.family.no";
pub const LOG_AGED: &str = "log.path.aged";
pub const LOG_DEATH_SURVIVED: &str = "log.death.survived";
pub const LOG_DIED: &str = "log.death.died";
pub const LOG_COMPLETED: &str = "log.journey.completed";

// Age ladder ---------------------------------------------------------------
/// Age at which every journey starts and the education question is asked.
pub const START_AGE: u32 = 10;
/// Age at which the family question is asked.
pub const FAMILY_SETUP_AGE: u32 = 20;
/// First age served from the regular (flag-matched) question tiers.
pub const FIRST_REGULAR_AGE: u32 = 30;
/// Years added per answered regular question.
pub const AGE_STEP: u32 = 10;
/// Journeys are over once the player is older than this.
pub const FINAL_AGE: u32 = 90;

// Death roll ---------------------------------------------------------------
/// Probability that straying from the declared philosopher ends the journey.
pub const DEFAULT_DEATH_CHANCE: f64 = 1.0 / 6.0;

// Table sentinels ----------------------------------------------------------
/// Literal marking a setup row in `has_education` / `has_family` (case-sensitive).
pub const UNSET_SENTINEL: &str = "null";
