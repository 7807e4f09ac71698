//! Random sources: deterministic per-domain streams and a scripted source for tests.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

use crate::numbers::{unit_to_index, usize_to_f64};

/// Injectable randomness used by question selection and the death roll.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        unit_to_index(self.next_unit(), len)
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

impl<R: RngCore> RandomSource for CountingRng<R> {
    fn next_unit(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.gen_range(0..len)
    }
}

/// Replays a fixed list of unit draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
    draws: u64,
}

impl ScriptedSource {
    /// Values are clamped into `[0, 1)`; an empty script always yields 0.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            cursor: 0,
            draws: 0,
        }
    }

    /// Source whose every draw is `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Source that draws the bucket midpoint `(index + 0.5) / len`, so
    /// `next_index(len)` returns `index`.
    #[must_use]
    pub fn picking(index: usize, len: usize) -> Self {
        let len = len.max(1);
        Self::constant((usize_to_f64(index) + 0.5) / usize_to_f64(len))
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

/// Deterministic bundle of RNG streams segregated by gameplay domain.
///
/// Each concern draws from its own stream so a replay with the same seed and
/// the same answers reproduces every question, roll and death reason.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    selection: CountingRng<SmallRng>,
    death: CountingRng<SmallRng>,
    reason: CountingRng<SmallRng>,
    shuffle: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            selection: CountingRng::new(derive_stream_seed(seed, b"selection")),
            death: CountingRng::new(derive_stream_seed(seed, b"death")),
            reason: CountingRng::new(derive_stream_seed(seed, b"reason")),
            shuffle: CountingRng::new(derive_stream_seed(seed, b"shuffle")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used to pick the next regular question.
    pub const fn selection(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.selection
    }

    /// Stream used by the death roll.
    pub const fn death(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.death
    }

    /// Stream used to pick a death reason.
    pub const fn reason(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.reason
    }

    /// Stream used to order options for display.
    pub const fn shuffle(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.shuffle
    }

    #[must_use]
    pub const fn selection_draws(&self) -> u64 {
        self.selection.draws()
    }

    #[must_use]
    pub const fn death_draws(&self) -> u64 {
        self.death.draws()
    }

    /// Total draws across all streams.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.selection
            .draws()
            .saturating_add(self.death.draws())
            .saturating_add(self.reason.draws())
            .saturating_add(self.shuffle.draws())
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
