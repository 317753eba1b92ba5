//! Deterministic random number generation for synthetic rosters.
//!
//! RULE: the scheduler itself never draws random numbers. Randomness is
//! only used to generate demo/test rosters, and all of it flows through
//! `RosterRng` streams derived from a single seed.
//!
//! Each concern gets its own stream, seeded from (seed XOR stream index),
//! so adding a new stream never changes existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct RosterRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl RosterRng {
    pub fn new(seed: u64, stream: RosterStream) -> Self {
        let derived_seed = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: stream.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform float in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RosterStream {
    Names = 0,
    Placement = 1,
    Scores = 2,
    Metrics = 3,
}

impl RosterStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Names => "names",
            Self::Placement => "placement",
            Self::Scores => "scores",
            Self::Metrics => "metrics",
        }
    }
}
