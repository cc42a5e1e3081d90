//! The deterministic pixel-selection PRNG.
//!
//! Embed and extract must issue the exact same sequence of draws for a given seed, or the
//! entire stream corrupts — a single divergent draw desyncs everything downstream of it. Any
//! uniform 32-bit-seeded generator is sufficient as long as embed and extract consult it
//! identically; this crate treats it as an oracle and backs it with `ChaCha20Rng`, a
//! RustCrypto-family generator well suited to deterministic pixel-index shuffling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A seeded, bit-reproducible uniform random source.
///
/// `seed` is expanded into the 256-bit ChaCha20 state via `ChaCha20Rng::seed_from_u64`, which is
/// itself a pure, deterministic function of the input — the same seed always produces the same
/// draw sequence on any platform.
pub struct Prng {
    rng: ChaCha20Rng,
}

impl Prng {
    /// Seeds a fresh generator from a 32-bit [`SeedMaterial`](crate::key::DerivedKey::seed).
    pub fn seeded(seed: u32) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed as u64),
        }
    }

    /// Draws a uniform value in `[0, 1)`.
    pub fn next_uniform_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Draws a uniform integer in `[0, bound)`. `bound` must be nonzero.
    pub fn next_int(&mut self, bound: u32) -> u32 {
        self.rng.random_range(0..bound)
    }

    /// Draws a standard-normal sample via the Box–Muller transform, consuming two
    /// `next_uniform_unit` draws from the same underlying state. Used by the frequency-domain
    /// modality's Gaussian-like perturbation pattern.
    pub fn next_gaussian(&mut self) -> f64 {
        // avoid ln(0) by keeping u1 away from the open boundary
        let u1 = (1.0 - self.next_uniform_unit()).max(f64::MIN_POSITIVE);
        let u2 = self.next_uniform_unit();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}
