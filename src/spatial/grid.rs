//! Wave grid holding the candidate domain of every output cell
//!
//! Each cell carries a [`PatternBitset`] of the pattern IDs still possible
//! there. A domain of one pattern is collapsed, an empty domain is a
//! contradiction, anything larger is undecided. Domains only shrink while
//! solving; restoring a snapshot or resetting the grid are the only ways back.

use ndarray::Array3;

use crate::algorithm::bitset::PatternBitset;
use crate::spatial::coord::Coord3;

/// State of a single cell's domain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// More than one candidate remains
    Undecided,
    /// Exactly one candidate remains
    Collapsed,
    /// No candidate remains
    Contradiction,
}

/// 3D array of candidate domains
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveGrid {
    cells: Array3<PatternBitset>,
    pattern_count: usize,
}

impl WaveGrid {
    /// Create a grid with every cell able to hold every pattern
    pub fn new(size: [usize; 3], pattern_count: usize) -> Self {
        Self {
            cells: Array3::from_elem(
                (size[0], size[1], size[2]),
                PatternBitset::all(pattern_count),
            ),
            pattern_count,
        }
    }

    /// Return every cell to the full domain
    pub fn reset(&mut self) {
        let full = PatternBitset::all(self.pattern_count);
        self.cells.fill(full);
    }

    /// Grid extent along each axis
    pub fn dimensions(&self) -> [usize; 3] {
        let (x, y, z) = self.cells.dim();
        [x, y, z]
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of patterns the domains range over
    pub const fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Domain of a cell
    pub fn domain(&self, position: [usize; 3]) -> Option<&PatternBitset> {
        self.cells.get(position)
    }

    /// Mutable domain of a cell
    pub fn domain_mut(&mut self, position: [usize; 3]) -> Option<&mut PatternBitset> {
        self.cells.get_mut(position)
    }

    /// Classify a cell's domain
    pub fn state(&self, position: [usize; 3]) -> Option<CellState> {
        self.domain(position).map(|domain| match domain.count() {
            0 => CellState::Contradiction,
            1 => CellState::Collapsed,
            _ => CellState::Undecided,
        })
    }

    /// Reduce a cell's domain to one pattern
    ///
    /// Returns false when the position is outside the grid.
    pub fn collapse(&mut self, position: [usize; 3], pattern: usize) -> bool {
        self.cells.get_mut(position).is_some_and(|domain| {
            domain.collapse_to(pattern);
            true
        })
    }

    /// Pattern of a collapsed cell
    pub fn collapsed_pattern(&self, position: [usize; 3]) -> Option<usize> {
        self.domain(position).and_then(PatternBitset::sole)
    }

    /// Cells that are neither collapsed nor contradicted, in x-major order
    pub fn collapsible_cells(&self) -> Vec<[usize; 3]> {
        self.cells
            .indexed_iter()
            .filter(|(_, domain)| domain.count() > 1)
            .map(|((x, y, z), _)| [x, y, z])
            .collect()
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|domain| domain.count() == 1)
            .count()
    }

    /// Whether every cell holds exactly one pattern
    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(|domain| domain.count() == 1)
    }

    /// Whether any cell has an empty domain
    pub fn has_contradiction(&self) -> bool {
        self.cells.iter().any(PatternBitset::is_empty)
    }

    /// Locate the cell at `offset` from `position`
    ///
    /// Periodic grids wrap on every axis; otherwise positions that fall
    /// outside the grid yield `None`.
    pub fn neighbour(
        &self,
        position: [usize; 3],
        offset: Coord3,
        periodic: bool,
    ) -> Option<[usize; 3]> {
        let target = Coord3::from_index(position) + offset;
        let extent = self.dimensions();
        if periodic {
            Some(target.wrap(extent))
        } else {
            target.to_index(extent)
        }
    }
}
