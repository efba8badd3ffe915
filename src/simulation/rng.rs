//! Random source threaded through generation and simulation
//!
//! Unseeded by default; a seed makes world generation, traffic turns and
//! order generation reproducible.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

pub struct SimRng {
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimRng {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map(StdRng::seed_from_u64),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(None)
    }

    pub fn is_seeded(&self) -> bool {
        self.rng.is_some()
    }

    /// Get a random value in the given range, using seeded RNG if available
    pub fn random_range(&mut self, range: std::ops::Range<f32>) -> f32 {
        if range.is_empty() {
            return range.start;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Random value in `[start, end]`; tolerates a degenerate range
    pub fn random_inclusive(&mut self, start: f32, end: f32) -> f32 {
        if end <= start {
            return start;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(start..=end),
            None => rand::rng().random_range(start..=end),
        }
    }

    pub fn random_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(0..len),
            None => rand::rng().random_range(0..len),
        }
    }

    /// Returns true with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        let p = p.clamp(0.0, 1.0);
        match &mut self.rng {
            Some(rng) => rng.random_bool(p),
            None => rand::rng().random_bool(p),
        }
    }

    /// Choose a random element from a slice, using seeded RNG if available
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
