//! Seeded randomness helpers.
//!
//! Every independent run owns exactly one [`StdRng`], created here from the
//! configured seed and passed explicitly into each component that draws
//! random numbers.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Creates a reproducible random number generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed, drawing a fresh one on `None`.
pub fn rng_from_option(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Draws `amount` distinct indices from `0..len` in random order.
///
/// Returns every index (shuffled) when `amount >= len`.
pub fn sample_indices<R: Rng>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    index::sample(rng, len, amount.min(len)).into_vec()
}

/// Returns `true` with the given probability, treating values outside
/// `[0, 1]` as the nearest bound.
pub fn chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    if probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.random_bool(probability)
    }
}
