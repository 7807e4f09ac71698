//! Death roll: the price of straying from the declared philosopher.
use crate::constants::DEFAULT_DEATH_CHANCE;
use crate::philosopher::Philosopher;
use crate::rng::RandomSource;

/// Flavour text shown when a journey ends early. Purely presentational.
pub const DEATH_REASONS: [&str; 10] = [
    "You were struck by lightning during a freak storm.",
    "You contracted a mysterious illness while traveling abroad.",
    "You were involved in an unfortunate accident.",
    "You ate some questionable street food and didn't recover.",
    "You were caught in a natural disaster.",
    "You had an unexpected allergic reaction.",
    "You were in the wrong place at the wrong time.",
    "Your journey ended due to unforeseen circumstances.",
    "Fate had other plans for you.",
    "A series of unfortunate events led to your early demise.",
];

/// Roll for death with the default 1-in-6 chance.
///
/// Never draws when `chosen == initial`.
pub fn roll_for_death<R>(chosen: Philosopher, initial: Philosopher, rng: &mut R) -> bool
where
    R: RandomSource + ?Sized,
{
    roll_for_death_with_chance(chosen, initial, DEFAULT_DEATH_CHANCE, rng)
}

/// Roll for death: one uniform draw, fatal when strictly below `chance`.
pub fn roll_for_death_with_chance<R>(
    chosen: Philosopher,
    initial: Philosopher,
    chance: f64,
    rng: &mut R,
) -> bool
where
    R: RandomSource + ?Sized,
{
    if chosen == initial {
        return false;
    }
    let draw = rng.next_unit();
    let died = draw < chance;
    log::debug!(
        "death roll: chose {chosen} over {initial}, draw {draw:.3} vs {chance:.3} -> {}",
        if died { "died" } else { "survived" }
    );
    died
}

/// Uniformly pick a death reason. Repeats across journeys are allowed.
pub fn pick_death_reason<R>(rng: &mut R) -> &'static str
where
    R: RandomSource + ?Sized,
{
    DEATH_REASONS[rng.next_index(DEATH_REASONS.len())]
}
