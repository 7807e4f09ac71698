//! Reversible journey codes so a run can be shared and replayed.
//! Code format: <TAG>-<WORD><NN>, e.g., KZ-LOTUS42, SH-BAMBOO07
use sha2::{Digest, Sha256};
use std::fmt;

use crate::philosopher::Philosopher;

pub const WORD_LIST: [&str; 64] = [
    "LOTUS", "BAMBOO", "RIVER", "MOUNTAIN", "SCROLL", "BRUSH", "INK", "JADE", "CRANE", "TIGER",
    "DRAGON", "WILLOW", "PLUM", "PINE", "LANTERN", "TEMPLE", "BRIDGE", "HARVEST", "MOON",
    "SUN", "CLOUD", "RAIN", "THUNDER", "VALLEY", "GATE", "WALL", "COURT", "SCHOLAR", "FARMER",
    "ARCHER", "CHARIOT", "BELL", "DRUM", "ZITHER", "KETTLE", "TEA", "RICE", "MILLET", "SILK",
    "PAPER", "SEAL", "MIRROR", "COMPASS", "ABACUS", "TORTOISE", "PHOENIX", "ORCHID", "PEONY",
    "CEDAR", "STONE", "WELL", "FIELD", "ROAD", "BOAT", "KITE", "FAN", "LADLE", "SPROUT",
    "ELDER", "PUPIL", "RITUAL", "VIRTUE", "WAY", "HARMONY",
];

const NUMBERS_PER_WORD: u64 = 100;
const SLOT_MASK: u64 = 0xFFFF;
const SEED_DOMAIN: &[u8] = b"lifepath/journey-code";

/// A parsed journey code: who is walking, plus a word and a two-digit number.
///
/// The low 16 bits of the seed hold the slot `word * 100 + number`; the rest is a
/// digest of the philosopher and the slot, so codes spread across the seed space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JourneyCode {
    philosopher: Philosopher,
    word: usize,
    number: u8,
}

impl JourneyCode {
    fn slots() -> u64 {
        u64::try_from(WORD_LIST.len()).unwrap_or(1) * NUMBERS_PER_WORD
    }

    fn from_slot(philosopher: Philosopher, slot: u64) -> Self {
        let slot = slot % Self::slots();
        Self {
            philosopher,
            word: usize::try_from(slot / NUMBERS_PER_WORD).unwrap_or(0),
            number: u8::try_from(slot % NUMBERS_PER_WORD).unwrap_or(0),
        }
    }

    fn slot(self) -> u64 {
        u64::try_from(self.word).unwrap_or(0) * NUMBERS_PER_WORD + u64::from(self.number)
    }

    fn parse(code: &str) -> Option<Self> {
        let (tag, rest) = code.trim().split_once('-')?;
        let philosopher = Philosopher::from_code_tag(tag)?;
        let split = rest.len().checked_sub(2).filter(|&at| at > 0)?;
        if !rest.is_ascii() {
            return None;
        }
        let (word, digits) = rest.split_at(split);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number = digits.parse().ok()?;
        let word = WORD_LIST
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(word))?;
        Some(Self {
            philosopher,
            word,
            number,
        })
    }

    fn seed(self) -> u64 {
        let slot = self.slot();
        let digest = Sha256::new()
            .chain_update(SEED_DOMAIN)
            .chain_update(self.philosopher.code_tag().as_bytes())
            .chain_update(slot.to_le_bytes())
            .finalize();
        let mut high = [0u8; 8];
        high.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(high) & !SLOT_MASK) | slot
    }
}

impl fmt::Display for JourneyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = WORD_LIST.get(self.word).copied().unwrap_or(WORD_LIST[0]);
        write!(f, "{}-{word}{:02}", self.philosopher.code_tag(), self.number)
    }
}

/// Render `seed` as a journey code for `philosopher`.
#[must_use]
pub fn encode_journey_code(philosopher: Philosopher, seed: u64) -> String {
    JourneyCode::from_slot(philosopher, seed & SLOT_MASK).to_string()
}

/// Decode a journey code into its philosopher and a deterministic seed.
#[must_use]
pub fn decode_journey_code(code: &str) -> Option<(Philosopher, u64)> {
    JourneyCode::parse(code).map(|parsed| (parsed.philosopher, parsed.seed()))
}

/// Build a fresh journey code from arbitrary entropy.
#[must_use]
pub fn generate_code_from_entropy(philosopher: Philosopher, entropy: u64) -> String {
    JourneyCode::from_slot(philosopher, entropy >> 7).to_string()
}
