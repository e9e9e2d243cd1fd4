//! Summary statistics of an adjacency table
//!
//! Used for the construction log line and to flag patterns that can never have
//! a neighbour on some side.

use crate::analysis::adjacency::AdjacencyTable;
use crate::spatial::coord::Coord3;

/// Pattern/offset slot whose allowed set is empty
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptySlot {
    /// Pattern ID
    pub pattern: usize,
    /// Offset with no allowed neighbour
    pub offset: Coord3,
}

/// Aggregate shape of an adjacency table
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyStatistics {
    /// Number of patterns covered
    pub pattern_count: usize,
    /// Offsets per pattern
    pub offset_count: usize,
    /// Allowed (pattern, offset, neighbour) triples
    pub allowed_pairs: usize,
    /// Slots that allow nothing
    pub empty_slots: Vec<EmptySlot>,
}

impl AdjacencyStatistics {
    /// Collect statistics from a table
    pub fn from_table(table: &AdjacencyTable) -> Self {
        let offsets = table.offsets();
        let mut allowed_pairs = 0;
        let mut empty_slots = Vec::new();

        for ((pattern, column), set) in table.sets().indexed_iter() {
            let count = set.count();
            allowed_pairs += count;
            if count == 0 {
                if let Some(&offset) = offsets.get(column) {
                    empty_slots.push(EmptySlot { pattern, offset });
                }
            }
        }

        Self {
            pattern_count: table.pattern_count(),
            offset_count: offsets.len(),
            allowed_pairs,
            empty_slots,
        }
    }

    /// Mean number of allowed neighbours per (pattern, offset) slot
    pub fn mean_allowed(&self) -> f64 {
        let slots = self.pattern_count * self.offset_count;
        if slots == 0 {
            0.0
        } else {
            self.allowed_pairs as f64 / slots as f64
        }
    }

    /// Patterns that have at least one empty slot, ascending and unique
    pub fn isolated_patterns(&self) -> Vec<usize> {
        let mut patterns: Vec<usize> = self.empty_slots.iter().map(|slot| slot.pattern).collect();
        patterns.dedup();
        patterns
    }
}
