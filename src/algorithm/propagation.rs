use ndarray::Array3;
use std::collections::VecDeque;

use crate::algorithm::bitset::PatternBitset;
use crate::analysis::adjacency::AdjacencyTable;
use crate::spatial::grid::WaveGrid;

/// Result of one propagation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// The queue drained without emptying any domain
    Settled {
        /// Candidates removed across the grid
        removed: usize,
        /// Whether every cell now holds exactly one pattern
        finished: bool,
    },
    /// A domain became empty
    Contradiction {
        /// Cell whose collapse started the run
        seed: [usize; 3],
        /// Cell whose domain emptied
        at: [usize; 3],
    },
}

/// Breadth-first arc-consistency over the wave grid
///
/// Holds the work queue and the pending markers between runs so repeated
/// propagation does not reallocate them.
#[derive(Debug, Default)]
pub struct PropagationEngine {
    queue: VecDeque<[usize; 3]>,
    pending: Array3<bool>,
    periodic: bool,
}

impl PropagationEngine {
    /// Create an engine for the given boundary policy
    pub fn new(periodic: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            pending: Array3::default((0, 0, 0)),
            periodic,
        }
    }

    /// Whether neighbours wrap around the grid edges
    pub const fn periodic(&self) -> bool {
        self.periodic
    }

    /// Restore consistency after the domain at `seed` changed
    ///
    /// Each visited cell narrows every neighbour to the union of what its
    /// remaining candidates allow at that offset. Neighbours that shrink are
    /// queued unless they are the seed or already pending. Offsets are walked
    /// in table order, so a seeded solver reproduces its runs exactly.
    pub fn propagate(
        &mut self,
        grid: &mut WaveGrid,
        adjacency: &AdjacencyTable,
        seed: [usize; 3],
    ) -> PropagationOutcome {
        self.reset(grid.dimensions());
        self.enqueue(seed);

        let pattern_count = grid.pattern_count();
        let mut allowed_union = PatternBitset::new(pattern_count);
        let mut removed = 0;

        while let Some(current) = self.queue.pop_front() {
            if let Some(flag) = self.pending.get_mut(current) {
                *flag = false;
            }
            let Some(candidates) = grid.domain(current).map(PatternBitset::to_vec) else {
                continue;
            };

            for (column, &offset) in adjacency.offsets().iter().enumerate() {
                let Some(target) = grid.neighbour(current, offset, self.periodic) else {
                    continue;
                };

                allowed_union.clear();
                for &pattern in &candidates {
                    if let Some(allowed) = adjacency.allowed(pattern, column) {
                        allowed_union.union_with(allowed);
                    }
                }

                let Some(domain) = grid.domain_mut(target) else {
                    continue;
                };
                let before = domain.count();
                domain.intersect_with(&allowed_union);
                let after = domain.count();
                if before == after {
                    continue;
                }

                removed += before - after;
                if after == 0 {
                    self.queue.clear();
                    return PropagationOutcome::Contradiction { seed, at: target };
                }
                if target != seed {
                    self.enqueue(target);
                }
            }
        }

        PropagationOutcome::Settled {
            removed,
            finished: grid.is_fully_collapsed(),
        }
    }

    /// First cell holding a candidate no neighbour can support
    ///
    /// Checks every cell and offset without modifying the grid. A neighbour
    /// domain must lie inside the union of what the cell's candidates allow
    /// at that offset.
    pub fn first_inconsistency(
        &self,
        grid: &WaveGrid,
        adjacency: &AdjacencyTable,
    ) -> Option<[usize; 3]> {
        let [width, height, depth] = grid.dimensions();
        let mut allowed_union = PatternBitset::new(grid.pattern_count());

        for x in 0..width {
            for y in 0..height {
                for z in 0..depth {
                    let current = [x, y, z];
                    let domain = grid.domain(current)?;
                    for (column, &offset) in adjacency.offsets().iter().enumerate() {
                        let Some(target) = grid.neighbour(current, offset, self.periodic) else {
                            continue;
                        };
                        allowed_union.clear();
                        for pattern in domain.iter() {
                            if let Some(allowed) = adjacency.allowed(pattern, column) {
                                allowed_union.union_with(allowed);
                            }
                        }
                        let supported = grid
                            .domain(target)
                            .is_some_and(|neighbour| neighbour.is_subset(&allowed_union));
                        if !supported {
                            return Some(current);
                        }
                    }
                }
            }
        }
        None
    }

    fn reset(&mut self, dimensions: [usize; 3]) {
        self.queue.clear();
        let (x, y, z) = self.pending.dim();
        if [x, y, z] == dimensions {
            self.pending.fill(false);
        } else {
            self.pending = Array3::from_elem((dimensions[0], dimensions[1], dimensions[2]), false);
        }
    }

    fn enqueue(&mut self, position: [usize; 3]) {
        if let Some(flag) = self.pending.get_mut(position) {
            if !*flag {
                *flag = true;
                self.queue.push_back(position);
            }
        }
    }
}
