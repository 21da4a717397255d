//! Deterministic random number generation
//!
//! World generation draws from a single linear-congruential stream seeded
//! from the world seed. AI decisions draw from ChaCha streams derived from
//! (game seed, faction, turn) so each faction's rolls are independent of the
//! order in which factions are planned.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LCG_MUL: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

/// Seeded 64-bit linear-congruential stream.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: seed };
        // Mix once so that small adjacent seeds diverge immediately.
        rng.step();
        rng
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.step() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        ((self.next_u32() as u64 * bound as u64) >> 32) as usize
    }

    pub fn range_inclusive(&mut self, min: u8, max: u8) -> u8 {
        min + self.below((max - min) as usize + 1) as u8
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }

    /// Index chosen with probability proportional to `weights`.
    /// Returns `None` when every weight is zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.next_f64() * total;
        let mut last = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if target < *weight {
                return Some(index);
            }
            target -= weight;
            last = Some(index);
        }
        last
    }
}

impl RngCore for LcgRng {
    fn next_u32(&mut self) -> u32 {
        LcgRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let high = LcgRng::next_u32(self) as u64;
        let low = LcgRng::next_u32(self) as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = LcgRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Hands out per-faction, per-turn streams for AI decisions.
#[derive(Clone, Debug)]
pub struct RngManager {
    master_seed: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn faction_rng(&self, faction: u32, turn: u32) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(faction as u64, turn as u64))
    }

    fn derive_seed(&self, entity_id: u64, turn: u64) -> u64 {
        let mut seed = self.master_seed;
        seed = seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        seed ^= entity_id.wrapping_mul(48271);
        seed = seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        seed ^= turn.wrapping_mul(69069);
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Probability rolls on any RNG.
pub trait RngExt {
    fn unit_f64(&mut self) -> f64;
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: RngCore + ?Sized> RngExt for R {
    fn unit_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.unit_f64() < probability
    }
}
