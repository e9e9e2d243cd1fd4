//! Snapshot stack and bounded rollback
//!
//! The solver pushes a whole-grid clone before every observation. When a
//! propagation empties a domain the manager pops one or more snapshots,
//! restores the grid, and remembers which cells were already tried in the
//! current rollback episode so the next observation prefers other cells.

use crate::algorithm::selection::RandomSelector;
use crate::io::configuration::{ROLLBACK_DEPTH_MEAN_FRACTION, ROLLBACK_DEPTH_STD_FRACTION};
use crate::math::probability::normal_rollback_depth;
use crate::spatial::grid::WaveGrid;

/// How many snapshots a single rollback discards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Pop exactly one snapshot
    #[default]
    Single,
    /// Pop a normally distributed number of snapshots clamped to the stack
    NormalDepth,
}

/// Result of a rollback request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// The grid was restored from an earlier snapshot
    Restored {
        /// Snapshots popped
        depth: usize,
    },
    /// The rollback ceiling was exceeded
    Exhausted,
    /// No snapshot was left to restore
    NoSnapshot,
}

impl RollbackOutcome {
    /// Whether the contradiction is terminal
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Restored { .. })
    }
}

/// Owner of the snapshot stack and rollback bookkeeping
#[derive(Clone, Debug)]
pub struct BacktrackManager {
    snapshots: Vec<WaveGrid>,
    chosen_points: Vec<[usize; 3]>,
    rollbacks: usize,
    max_rollbacks: usize,
    policy: RollbackPolicy,
    rolling_back: bool,
}

impl BacktrackManager {
    /// Create an empty manager
    pub const fn new(max_rollbacks: usize, policy: RollbackPolicy) -> Self {
        Self {
            snapshots: Vec::new(),
            chosen_points: Vec::new(),
            rollbacks: 0,
            max_rollbacks,
            policy,
            rolling_back: false,
        }
    }

    /// Save a copy of the grid
    pub fn push_snapshot(&mut self, grid: &WaveGrid) {
        self.snapshots.push(grid.clone());
    }

    /// Remember a cell whose collapse led to a contradiction
    pub fn record_chosen_point(&mut self, position: [usize; 3]) {
        if !self.chosen_points.contains(&position) {
            self.chosen_points.push(position);
        }
    }

    /// Cells tried during the current rollback episode
    pub fn chosen_points(&self) -> &[[usize; 3]] {
        &self.chosen_points
    }

    /// End the rollback episode
    pub fn clear_chosen_points(&mut self) {
        self.chosen_points.clear();
    }

    /// Undo recent observations after a contradiction seeded at `seed`
    ///
    /// Counts the attempt against the ceiling before touching the stack, so a
    /// ceiling of zero makes every contradiction terminal.
    pub fn rollback(
        &mut self,
        grid: &mut WaveGrid,
        seed: [usize; 3],
        selector: &mut RandomSelector,
    ) -> RollbackOutcome {
        self.record_chosen_point(seed);
        self.rollbacks += 1;
        if self.rollbacks > self.max_rollbacks {
            return RollbackOutcome::Exhausted;
        }

        let available = self.snapshots.len();
        let depth = match self.policy {
            RollbackPolicy::Single => available.min(1),
            RollbackPolicy::NormalDepth => {
                let stack = available as f64;
                let mean = ROLLBACK_DEPTH_MEAN_FRACTION * stack;
                let sample = selector
                    .normal(mean, ROLLBACK_DEPTH_STD_FRACTION * stack)
                    .unwrap_or(mean);
                normal_rollback_depth(available, sample)
            }
        };

        let mut restored = None;
        for _ in 0..depth {
            restored = self.snapshots.pop();
        }
        let Some(snapshot) = restored else {
            return RollbackOutcome::NoSnapshot;
        };

        *grid = snapshot;
        self.rolling_back = true;
        RollbackOutcome::Restored { depth }
    }

    /// Whether the last step rolled back, clearing the flag
    pub fn take_rolling_back(&mut self) -> bool {
        std::mem::take(&mut self.rolling_back)
    }

    /// Drop every snapshot and counter
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.chosen_points.clear();
        self.rollbacks = 0;
        self.rolling_back = false;
    }

    /// Snapshots currently held
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    /// Rollbacks attempted since the last reset
    pub const fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    /// Rollback ceiling
    pub const fn max_rollbacks(&self) -> usize {
        self.max_rollbacks
    }

    /// Configured depth policy
    pub const fn policy(&self) -> RollbackPolicy {
        self.policy
    }
}
