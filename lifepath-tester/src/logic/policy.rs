use std::fmt;
use std::str::FromStr;

use lifepath_game::{LifeSession, Philosopher, Question};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub philosopher: Philosopher,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(philosopher: Philosopher, rationale: Option<String>) -> Self {
        Self {
            philosopher,
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select an answer for the question on screen.
    fn pick_choice(&mut self, session: &LifeSession, question: &Question) -> PolicyDecision;
}

/// Built-in answering strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStrategy {
    /// Always answers as the declared philosopher.
    Devoted,
    /// Never answers as the declared philosopher.
    Contrarian,
    /// Picks uniformly among the displayed options.
    Wanderer,
    /// Picks the option with the highest point total.
    PointMaximiser,
}

impl PlayerStrategy {
    pub const ALL: [Self; 4] = [
        Self::Devoted,
        Self::Contrarian,
        Self::Wanderer,
        Self::PointMaximiser,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Devoted => "Devoted",
            Self::Contrarian => "Contrarian",
            Self::Wanderer => "Wanderer",
            Self::PointMaximiser => "Point Maximiser",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Devoted => Box::new(DevotedPolicy),
            Self::Contrarian => Box::new(ContrarianPolicy),
            Self::Wanderer => Box::new(WandererPolicy::new(seed)),
            Self::PointMaximiser => Box::new(PointMaximiserPolicy),
        }
    }
}

impl fmt::Display for PlayerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlayerStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().to_ascii_lowercase().replace(' ', "-") == wanted)
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

fn declared(session: &LifeSession) -> Philosopher {
    session
        .initial_philosopher()
        .unwrap_or(Philosopher::Kongzi)
}

struct DevotedPolicy;
struct ContrarianPolicy;
struct PointMaximiserPolicy;

struct WandererPolicy {
    rng: ChaCha20Rng,
}

impl WandererPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for DevotedPolicy {
    fn name(&self) -> &'static str {
        "Devoted"
    }

    fn pick_choice(&mut self, session: &LifeSession, _question: &Question) -> PolicyDecision {
        PolicyDecision::new(declared(session), None)
    }
}

impl PlayerPolicy for ContrarianPolicy {
    fn name(&self) -> &'static str {
        "Contrarian"
    }

    fn pick_choice(&mut self, session: &LifeSession, _question: &Question) -> PolicyDecision {
        let initial = declared(session);
        let pick = session
            .option_order()
            .iter()
            .copied()
            .chain(Philosopher::ALL)
            .find(|&p| p != initial)
            .unwrap_or(initial);
        PolicyDecision::new(pick, Some(format!("anything but {initial}")))
    }
}

impl PlayerPolicy for WandererPolicy {
    fn name(&self) -> &'static str {
        "Wanderer"
    }

    fn pick_choice(&mut self, session: &LifeSession, _question: &Question) -> PolicyDecision {
        let order = session.option_order();
        let candidates: &[Philosopher] = if order.is_empty() {
            &Philosopher::ALL
        } else {
            order
        };
        let idx = self.rng.gen_range(0..candidates.len());
        PolicyDecision::new(candidates[idx], Some(format!("slot {}", idx + 1)))
    }
}

impl PlayerPolicy for PointMaximiserPolicy {
    fn name(&self) -> &'static str {
        "Point Maximiser"
    }

    fn pick_choice(&mut self, session: &LifeSession, question: &Question) -> PolicyDecision {
        let best = question.options().fold(None, |best, option| match best {
            Some((_, top)) if option.points.total() <= top => best,
            _ => Some((option.philosopher, option.points.total())),
        });
        match best {
            Some((philosopher, total)) => {
                PolicyDecision::new(philosopher, Some(format!("total {total}")))
            }
            None => PolicyDecision::new(declared(session), Some("no options".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifepath_game::{QuestionPool, SessionConfig};
    use std::sync::Arc;

    fn session(philosopher: Philosopher) -> LifeSession {
        let pool = Arc::new(QuestionPool::bundled().unwrap());
        let mut session = LifeSession::new(pool, 17, SessionConfig::default());
        session.select_philosopher(philosopher).unwrap();
        session
    }

    #[test]
    fn devoted_and_contrarian_follow_the_declaration() {
        let session = session(Philosopher::Mozi);
        let question = session.current_question().unwrap().clone();
        let mut devoted = PlayerStrategy::Devoted.create_policy(1);
        let mut contrarian = PlayerStrategy::Contrarian.create_policy(1);
        assert_eq!(
            devoted.pick_choice(&session, &question).philosopher,
            Philosopher::Mozi
        );
        assert_ne!(
            contrarian.pick_choice(&session, &question).philosopher,
            Philosopher::Mozi
        );
    }

    #[test]
    fn wanderer_is_reproducible_per_seed() {
        let session = session(Philosopher::Laozi);
        let question = session.current_question().unwrap().clone();
        let picks = |seed| {
            let mut policy = PlayerStrategy::Wanderer.create_policy(seed);
            (0..16)
                .map(|_| policy.pick_choice(&session, &question).philosopher)
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(5), picks(5));
    }

    #[test]
    fn point_maximiser_takes_first_highest_total() {
        let session = session(Philosopher::Kongzi);
        let question = session.current_question().unwrap().clone();
        let top = question.options().map(|o| o.points.total()).max().unwrap();
        let expected = question
            .options()
            .find(|o| o.points.total() == top)
            .unwrap()
            .philosopher;
        let mut policy = PlayerStrategy::PointMaximiser.create_policy(0);
        assert_eq!(policy.pick_choice(&session, &question).philosopher, expected);
    }

    #[test]
    fn strategies_parse_from_labels() {
        assert_eq!(
            "point-maximiser".parse::<PlayerStrategy>(),
            Ok(PlayerStrategy::PointMaximiser)
        );
        assert_eq!("Devoted".parse::<PlayerStrategy>(), Ok(PlayerStrategy::Devoted));
        assert!("greedy".parse::<PlayerStrategy>().is_err());
    }
}
