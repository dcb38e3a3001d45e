//! Per-shot seed derivation
//!
//! Gantree: L7_Integration → ShotSeeds
//!
//! Seeds are counter-based: shot `i` of a run seeded with `s` reads the
//! first word of ChaCha20 stream `i` keyed by `s`. No RNG state is shared
//! between shots, so the order in which shots run does not matter.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Seed for shot `index` of a run
/// Gantree: shot_seed(run_seed, index) -> u64 // 카운터 기반 파생
pub fn shot_seed(run_seed: u64, index: usize) -> u64 {
    let mut rng = ChaCha20Rng::seed_from_u64(run_seed);
    rng.set_stream(index as u64);
    rng.next_u64()
}

/// Seeds handed to the collaborators of one shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotSeeds {
    /// Reported seed; reproduces the shot on its own
    pub shot: u64,
    /// Simulator sampling
    pub backend: u64,
    /// Error draws
    pub noise: u64,
}

impl ShotSeeds {
    /// Seeds for shot `index` of a run
    pub fn derive(run_seed: u64, index: usize) -> Self {
        Self::from_shot_seed(shot_seed(run_seed, index))
    }

    /// Expand a reported shot seed
    pub fn from_shot_seed(shot: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(shot);
        Self {
            shot,
            backend: rng.next_u64(),
            noise: rng.next_u64(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
