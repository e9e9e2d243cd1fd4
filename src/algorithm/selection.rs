use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Normal;

use crate::algorithm::bitset::PatternBitset;

/// Seeded random selector for reproducible stochastic choices
///
/// The single source of randomness of a solver: cell picks, pattern
/// sampling, shuffles and rollback depth all draw from it.
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..len`, `None` when `len` is zero
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Weighted random selection over non-negative weights
    ///
    /// Draws `r` uniformly from `[0, total)` and returns the first index whose
    /// running total exceeds `r`. Returns `None` when the weights sum to zero.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || weights.is_empty() {
            return None;
        }

        let draw = self.rng.random::<f64>() * total;
        let mut running_total = 0.0;
        for (i, &weight) in weights.iter().enumerate() {
            running_total += weight;
            if running_total > draw {
                return Some(i);
            }
        }
        // Rounding can leave the running total a hair below the draw
        weights.iter().rposition(|&weight| weight > 0.0)
    }

    /// Draw from a normal distribution
    ///
    /// Returns `None` when `std_dev` is negative or not finite.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> Option<f64> {
        let distribution = Normal::new(mean, std_dev).ok()?;
        Some(self.rng.sample(distribution))
    }
}

/// Pick the next cell to collapse
///
/// Cells chosen earlier in the current rollback episode are skipped while
/// other candidates remain.
pub fn select_cell(
    collapsible: &[[usize; 3]],
    chosen_points: &[[usize; 3]],
    selector: &mut RandomSelector,
) -> Option<[usize; 3]> {
    let fresh: Vec<[usize; 3]> = collapsible
        .iter()
        .filter(|&cell| !chosen_points.contains(cell))
        .copied()
        .collect();
    let pool = if fresh.is_empty() {
        collapsible
    } else {
        fresh.as_slice()
    };
    selector
        .pick_index(pool.len())
        .and_then(|index| pool.get(index).copied())
}

/// Choose the pattern a cell collapses to
///
/// Probabilistic mode shuffles the domain and samples it weighted by pattern
/// frequency; otherwise every candidate is equally likely.
pub fn choose_pattern(
    domain: &PatternBitset,
    frequencies: &[f64],
    probabilistic: bool,
    selector: &mut RandomSelector,
) -> Option<usize> {
    let mut candidates = domain.to_vec();
    if !probabilistic {
        return selector
            .pick_index(candidates.len())
            .and_then(|index| candidates.get(index).copied());
    }

    selector.shuffle(&mut candidates);
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&pattern| frequencies.get(pattern).copied().unwrap_or(0.0))
        .collect();
    selector
        .weighted_choice(&weights)
        .and_then(|index| candidates.get(index).copied())
}
