//! End-of-journey aggregation: adherence, affinity ranking and the result report.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::PointTotals;
use crate::numbers::percent_of;
use crate::philosopher::Philosopher;

/// One answered question, appended in play order (the fatal answer included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub philosopher: Philosopher,
    pub question: String,
    pub choice: String,
    pub age: u32,
}

/// How closely the player followed their declared philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdherenceTier {
    /// 75% or more
    Excellent,
    /// 50% to 74%
    Good,
    /// 25% to 49%
    Exploring,
    /// Below 25%
    Discovering,
}

impl AdherenceTier {
    #[must_use]
    pub const fn from_percentage(percentage: i32) -> Self {
        if percentage >= 75 {
            Self::Excellent
        } else if percentage >= 50 {
            Self::Good
        } else if percentage >= 25 {
            Self::Exploring
        } else {
            Self::Discovering
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Excellent => "🎯 Excellent! You stayed true to your chosen path.",
            Self::Good => "👍 Good consistency with your initial philosophical choice.",
            Self::Exploring => "🤔 Your journey led you to explore other perspectives.",
            Self::Discovering => "🌟 You discovered new philosophical alignments along the way.",
        }
    }
}

impl fmt::Display for AdherenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Per-philosopher share of all answers, for alignment bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentShare {
    pub philosopher: Philosopher,
    pub count: usize,
    pub percentage: i32,
}

/// Complete summary of a journey for the result screen and automated reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub initial_philosopher: Philosopher,
    pub choices_made: usize,
    pub adherence_count: usize,
    pub adherence_percentage: i32,
    pub tier: AdherenceTier,
    /// Occurrence counts in first-occurrence order. Philosophers never chosen are absent.
    pub counts: Vec<(Philosopher, usize)>,
    /// Descending by count; ties keep first-occurrence order.
    pub ranking: Vec<Philosopher>,
    /// `None` when no answers were recorded ("Unknown").
    pub primary: Option<Philosopher>,
    pub primary_count: usize,
    pub totals: PointTotals,
    pub total_points: i32,
    pub is_dead: bool,
    pub death_reason: Option<String>,
    pub final_age: u32,
}

impl Report {
    /// Display name of the primary affinity, or "Unknown".
    #[must_use]
    pub fn primary_name(&self) -> &'static str {
        self.primary.map_or("Unknown", Philosopher::name)
    }

    #[must_use]
    pub fn count_for(&self, philosopher: Philosopher) -> usize {
        self.counts
            .iter()
            .find_map(|&(p, n)| (p == philosopher).then_some(n))
            .unwrap_or(0)
    }

    /// Share of every philosopher in `Philosopher::ALL` order, zeroes included.
    #[must_use]
    pub fn alignment(&self) -> Vec<AlignmentShare> {
        Philosopher::ALL
            .into_iter()
            .map(|philosopher| {
                let count = self.count_for(philosopher);
                AlignmentShare {
                    philosopher,
                    count,
                    percentage: percent_of(count, self.choices_made),
                }
            })
            .collect()
    }

    /// Whether the strongest affinity differs from the declared one.
    #[must_use]
    pub fn drifted(&self) -> bool {
        self.primary.is_some_and(|p| p != self.initial_philosopher)
    }
}

fn tally(choices: &[ChoiceRecord]) -> Vec<(Philosopher, usize)> {
    let mut counts: Vec<(Philosopher, usize)> = Vec::with_capacity(Philosopher::ALL.len());
    for record in choices {
        match counts.iter_mut().find(|(p, _)| *p == record.philosopher) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.philosopher, 1)),
        }
    }
    counts
}

/// Aggregate a journey's answers. Pure; never fails.
#[must_use]
pub fn summarize(
    choices: &[ChoiceRecord],
    initial: Philosopher,
    totals: PointTotals,
    death_reason: Option<&str>,
    final_age: u32,
) -> Report {
    let counts = tally(choices);
    let adherence_count = choices.iter().filter(|c| c.philosopher == initial).count();
    let adherence_percentage = percent_of(adherence_count, choices.len());

    let mut ranked = counts.clone();
    // `sort_by` is stable, so equal counts keep first-occurrence order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let ranking: Vec<Philosopher> = ranked.iter().map(|&(p, _)| p).collect();
    let (primary, primary_count) = ranked
        .first()
        .map_or((None, 0), |&(p, n)| (Some(p), n));

    Report {
        initial_philosopher: initial,
        choices_made: choices.len(),
        adherence_count,
        adherence_percentage,
        tier: AdherenceTier::from_percentage(adherence_percentage),
        counts,
        ranking,
        primary,
        primary_count,
        totals,
        total_points: totals.total(),
        is_dead: death_reason.is_some(),
        death_reason: death_reason.map(str::to_string),
        final_age,
    }
}
