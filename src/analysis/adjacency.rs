//! Adjacency rules between patterns
//!
//! A table maps (pattern, offset) to the set of patterns allowed at that
//! offset. Two neighbourhoods exist: the six axis directions used by the
//! lattice model, and every offset in `[-(N-1), N-1]^3` used by the overlap
//! model. Offsets are columns of a dense array, never hash keys.
//!
//! Every construction rule is reversible: if B is allowed at offset D from A,
//! then A is allowed at offset -D from B.

use ndarray::Array2;

use crate::algorithm::bitset::PatternBitset;
use crate::analysis::patterns::{ExtractionMode, PatternLibrary};
use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::spatial::coord::{Coord3, Direction};

/// Which relative positions the table is keyed by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbourhood {
    /// The six axis directions, columns ordered as [`Direction::ALL`]
    Axis,
    /// Every offset within `radius` on each axis, `(2 * radius + 1)^3` columns
    Overlap {
        /// Largest offset magnitude per axis (pattern size minus one)
        radius: usize,
    },
}

impl Neighbourhood {
    /// Offsets in column order
    pub fn offsets(self) -> Vec<Coord3> {
        match self {
            Self::Axis => Direction::ALL.iter().map(|direction| direction.offset()).collect(),
            Self::Overlap { radius } => {
                let r = radius as i32;
                let mut offsets = Vec::with_capacity((2 * radius + 1).pow(3));
                for dx in -r..=r {
                    for dy in -r..=r {
                        for dz in -r..=r {
                            offsets.push(Coord3::new(dx, dy, dz));
                        }
                    }
                }
                offsets
            }
        }
    }

    /// Column of an offset, `None` if the offset is not part of the neighbourhood
    pub fn offset_index(self, offset: Coord3) -> Option<usize> {
        match self {
            Self::Axis => Direction::ALL
                .iter()
                .position(|direction| direction.offset() == offset),
            Self::Overlap { radius } => {
                let r = radius as i32;
                let span = 2 * radius + 1;
                let shifted = [offset.x + r, offset.y + r, offset.z + r];
                if shifted.iter().any(|&component| component < 0 || component > 2 * r) {
                    return None;
                }
                let [x, y, z] = shifted.map(|component| component as usize);
                Some((x * span + y) * span + z)
            }
        }
    }
}

/// Read-only compatibility table
#[derive(Clone, Debug)]
pub struct AdjacencyTable {
    neighbourhood: Neighbourhood,
    offsets: Vec<Coord3>,
    allowed: Array2<PatternBitset>,
}

impl AdjacencyTable {
    /// Create a table with nothing allowed anywhere
    pub fn empty(pattern_count: usize, neighbourhood: Neighbourhood) -> Self {
        let offsets = neighbourhood.offsets();
        Self {
            neighbourhood,
            allowed: Array2::from_elem(
                (pattern_count, offsets.len()),
                PatternBitset::new(pattern_count),
            ),
            offsets,
        }
    }

    /// Build the table matching how the library was extracted
    ///
    /// Lattice libraries use the co-occurrence scan, optionally augmented by
    /// border matching; overlapping libraries use the overlap test.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::from_lattice`]
    pub fn build(library: &PatternLibrary, periodic: bool, augment_neighbours: bool) -> Result<Self> {
        match library.mode() {
            ExtractionMode::Lattice => {
                let mut table = Self::from_lattice(library, periodic)?;
                if augment_neighbours {
                    table.augment_with_border_matches(library);
                }
                Ok(table)
            }
            ExtractionMode::Overlapping => Ok(Self::from_overlaps(library)),
        }
    }

    /// Record which patterns sit next to each other in the block lattice
    ///
    /// Out-of-range neighbours wrap to the opposite edge when `periodic` and
    /// contribute nothing otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the occurrence map references unknown patterns
    pub fn from_lattice(library: &PatternLibrary, periodic: bool) -> Result<Self> {
        let pattern_count = library.len();
        let mut table = Self::empty(pattern_count, Neighbourhood::Axis);
        let lattice = library.occurrences();
        let (lx, ly, lz) = lattice.dim();
        let extent = [lx, ly, lz];

        for ((x, y, z), &pattern) in lattice.indexed_iter() {
            if pattern >= pattern_count {
                return Err(SynthesisError::InvalidPatternIndex {
                    index: pattern,
                    pattern_count,
                });
            }
            let here = Coord3::from_index([x, y, z]);
            for direction in Direction::ALL {
                let target = here + direction.offset();
                let position = if periodic {
                    Some(target.wrap(extent))
                } else {
                    target.to_index(extent)
                };
                if let Some(&neighbour) = position.and_then(|position| lattice.get(position)) {
                    table.allow(pattern, direction.index(), neighbour);
                }
            }
        }

        Ok(table)
    }

    /// Add every pattern pair whose touching faces are identical
    ///
    /// Recovers adjacencies the finite sample never shows.
    pub fn augment_with_border_matches(&mut self, library: &PatternLibrary) {
        if self.neighbourhood != Neighbourhood::Axis {
            return;
        }
        for (a, pattern) in library.patterns().iter().enumerate() {
            for (b, other) in library.patterns().iter().enumerate() {
                for direction in Direction::ALL {
                    if pattern.fits(other, direction) {
                        self.allow(a, direction.index(), b);
                    }
                }
            }
        }
    }

    /// Test every ordered pattern pair at every overlap offset
    ///
    /// B is allowed at offset D from A when both patterns agree on every voxel
    /// of the region they share once B's origin sits at D.
    pub fn from_overlaps(library: &PatternLibrary) -> Self {
        let n = library.pattern_size();
        let pattern_count = library.len();
        let mut table = Self::empty(pattern_count, Neighbourhood::Overlap { radius: n - 1 });
        let offsets = table.offsets.clone();

        for (a, pattern) in library.patterns().iter().enumerate() {
            for (b, other) in library.patterns().iter().enumerate() {
                for (column, &offset) in offsets.iter().enumerate() {
                    if overlap_agrees(pattern.cells(), other.cells(), n, offset) {
                        table.allow(a, column, b);
                    }
                }
            }
        }

        table
    }

    /// Permit `neighbour` at the column `offset_index` of `pattern`
    pub fn allow(&mut self, pattern: usize, offset_index: usize, neighbour: usize) {
        if let Some(set) = self.allowed.get_mut([pattern, offset_index]) {
            set.insert(neighbour);
        }
    }

    /// Permit `neighbour` in `direction` of `pattern` and the reverse relation
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not keyed by axis directions or a
    /// pattern ID is out of range
    pub fn allow_pair(&mut self, pattern: usize, direction: Direction, neighbour: usize) -> Result<()> {
        if self.neighbourhood != Neighbourhood::Axis {
            return Err(invalid_parameter(
                "neighbourhood",
                &format!("{:?}", self.neighbourhood),
                &"direction pairs only apply to axis tables",
            ));
        }
        let pattern_count = self.pattern_count();
        for index in [pattern, neighbour] {
            if index >= pattern_count {
                return Err(SynthesisError::InvalidPatternIndex {
                    index,
                    pattern_count,
                });
            }
        }
        self.allow(pattern, direction.index(), neighbour);
        self.allow(neighbour, direction.opposite().index(), pattern);
        Ok(())
    }

    /// Patterns allowed at column `offset_index` of `pattern`
    pub fn allowed(&self, pattern: usize, offset_index: usize) -> Option<&PatternBitset> {
        self.allowed.get([pattern, offset_index])
    }

    /// Whether `neighbour` may sit at `offset` from `pattern`
    pub fn is_compatible(&self, pattern: usize, offset: Coord3, neighbour: usize) -> bool {
        self.neighbourhood
            .offset_index(offset)
            .and_then(|column| self.allowed(pattern, column))
            .is_some_and(|set| set.contains(neighbour))
    }

    /// Offsets in column order
    pub fn offsets(&self) -> &[Coord3] {
        &self.offsets
    }

    /// How the table is keyed
    pub const fn neighbourhood(&self) -> Neighbourhood {
        self.neighbourhood
    }

    /// Number of patterns the table covers
    pub fn pattern_count(&self) -> usize {
        self.allowed.nrows()
    }

    /// Every allowed set, one row per pattern and one column per offset
    pub const fn sets(&self) -> &Array2<PatternBitset> {
        &self.allowed
    }
}

/// Whether two patterns agree where they overlap with `other` shifted by `offset`
fn overlap_agrees(pattern: &[u8], other: &[u8], n: usize, offset: Coord3) -> bool {
    let size = n as i32;
    let range = |shift: i32| shift.max(0)..(size + shift).min(size);
    let index = |x: i32, y: i32, z: i32| ((x * size + y) * size + z) as usize;

    for x in range(offset.x) {
        for y in range(offset.y) {
            for z in range(offset.z) {
                let here = pattern.get(index(x, y, z));
                let there = other.get(index(x - offset.x, y - offset.y, z - offset.z));
                if here != there {
                    return false;
                }
            }
        }
    }
    true
}
