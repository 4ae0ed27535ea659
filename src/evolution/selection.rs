//! Rule selectors.
//!
//! Each selector picks one rule from a candidate list, using the fitness
//! memoized in [`RuleStatistics`]. All selectors **maximize** fitness.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::grammar::Rule;
use crate::stats::RuleStatistics;

/// Selection strategy for picking a parent rule.
///
/// # Examples
///
/// ```
/// use gcs_induction::evolution::Selector;
///
/// // tournament of 2 plus one uniformly random pick
/// let selectors = vec![Selector::Tournament(2), Selector::Random];
/// assert_eq!(selectors.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selector {
    /// Uniformly random rule.
    Random,

    /// Pick `k` rules at random (with replacement), keep the fittest.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate selection.
    ///
    /// Falls back to a uniform pick when every candidate has zero fitness.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Linear ranking: weight `n - rank`, best rank first.
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Tournament(2)
    }
}

impl Selector {
    /// Selects one rule from `candidates`, `None` if there are none.
    pub fn select<R: Rng>(
        &self,
        candidates: &[Rule],
        statistics: &RuleStatistics,
        rng: &mut R,
    ) -> Option<Rule> {
        if candidates.len() <= 1 {
            return candidates.first().copied();
        }
        let index = match self {
            Selector::Random => rng.random_range(0..candidates.len()),
            Selector::Tournament(k) => tournament(candidates, statistics, *k, rng),
            Selector::Roulette => roulette(candidates, statistics, rng),
            Selector::Rank => rank(candidates, statistics, rng),
        };
        candidates.get(index).copied()
    }
}

fn tournament<R: Rng>(candidates: &[Rule], statistics: &RuleStatistics, k: usize, rng: &mut R) -> usize {
    let n = candidates.len();
    let mut best = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let i = rng.random_range(0..n);
        if statistics.fitness(&candidates[i]) > statistics.fitness(&candidates[best]) {
            best = i;
        }
    }
    best
}

fn roulette<R: Rng>(candidates: &[Rule], statistics: &RuleStatistics, rng: &mut R) -> usize {
    let weights: Vec<f64> = candidates
        .iter()
        .map(|r| statistics.fitness(r).max(0.0))
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return rng.random_range(0..candidates.len());
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }
    candidates.len() - 1 // floating-point fallback
}

fn rank<R: Rng>(candidates: &[Rule], statistics: &RuleStatistics, rng: &mut R) -> usize {
    let n = candidates.len();
    let mut indexed: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(i, r)| (i, statistics.fitness(r)))
        .collect();
    // best first
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (position, &(index, _)) in indexed.iter().enumerate() {
        cumulative += (n - position) as f64;
        if cumulative > threshold {
            return index;
        }
    }
    indexed.choose(rng).map_or(0, |&(i, _)| i)
}
