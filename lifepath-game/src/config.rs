//! Session tuning loaded from JSON.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_DEATH_CHANCE, FINAL_AGE, FIRST_REGULAR_AGE};

const DEFAULT_RULES_DATA: &str = include_str!("../assets/data/rules.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("death_chance {0} is outside [0, 1]")]
    DeathChanceOutOfRange(f64),
    #[error("final_age {value} is below the first regular age {minimum}")]
    FinalAgeTooLow { value: u32, minimum: u32 },
    #[error("rules document could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for a single journey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Probability that a mismatched answer is fatal.
    #[serde(default = "default_death_chance")]
    pub death_chance: f64,
    /// Journeys end once the player is older than this.
    #[serde(default = "default_final_age")]
    pub final_age: u32,
    /// Present options in a per-question random order.
    #[serde(default = "default_shuffle_options")]
    pub shuffle_options: bool,
}

const fn default_death_chance() -> f64 {
    DEFAULT_DEATH_CHANCE
}

const fn default_final_age() -> u32 {
    FINAL_AGE
}

const fn default_shuffle_options() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            death_chance: default_death_chance(),
            final_age: default_final_age(),
            shuffle_options: default_shuffle_options(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON rules document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the bundled rules, falling back to defaults if they fail to parse.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_RULES_DATA).unwrap_or_else(|err| {
            log::warn!("bundled rules rejected, using defaults: {err}");
            Self::default()
        })
    }

    /// # Errors
    ///
    /// Returns an error if `death_chance` is outside `[0, 1]` or `final_age` is
    /// below the first regular age.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.death_chance) {
            return Err(ConfigError::DeathChanceOutOfRange(self.death_chance));
        }
        if self.final_age < FIRST_REGULAR_AGE {
            return Err(ConfigError::FinalAgeTooLow {
                value: self.final_age,
                minimum: FIRST_REGULAR_AGE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_takes_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!((config.death_chance - 1.0 / 6.0).abs() < f64::EPSILON);
        assert_eq!(config.final_age, 90);
        assert!(config.shuffle_options);
    }

    #[test]
    fn bundled_rules_match_defaults() {
        let bundled = SessionConfig::load_from_static();
        let defaults = SessionConfig::default();
        assert!((bundled.death_chance - defaults.death_chance).abs() < 1e-12);
        assert_eq!(bundled.final_age, defaults.final_age);
        assert_eq!(bundled.shuffle_options, defaults.shuffle_options);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            SessionConfig::from_json(r#"{"death_chance": 0.5, "shuffle_options": false}"#)
                .unwrap();
        assert!((config.death_chance - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.final_age, 90);
        assert!(!config.shuffle_options);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            SessionConfig::from_json(r#"{"death_chance": 1.5}"#),
            Err(ConfigError::DeathChanceOutOfRange(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{"death_chance": -0.1}"#),
            Err(ConfigError::DeathChanceOutOfRange(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{"final_age": 20}"#),
            Err(ConfigError::FinalAgeTooLow { value: 20, .. })
        ));
        assert!(matches!(
            SessionConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
