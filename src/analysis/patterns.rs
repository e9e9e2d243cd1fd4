//! Pattern extraction from sample volumes
//!
//! Cuts the sample into NxNxN blocks, either one window per position
//! (overlapping) or on an aligned lattice, and deduplicates them into a
//! pattern table with occurrence frequencies.

use ndarray::Array3;
use std::collections::{HashMap, HashSet};

use crate::io::configuration::MAX_PATTERN_SIZE;
use crate::io::error::{Result, invalid_parameter, invalid_source};
use crate::spatial::coord::Direction;
use crate::spatial::volume::{EMPTY_COLOR, VoxelVolume};

/// NxNxN block of color indices, compared by value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    size: usize,
    cells: Vec<u8>,
}

impl Pattern {
    /// Build a pattern from colors laid out x-major (`x * N * N + y * N + z`)
    ///
    /// # Errors
    ///
    /// Returns an error if `cells` does not hold exactly `size^3` colors
    pub fn from_cells(size: usize, cells: Vec<u8>) -> Result<Self> {
        if size == 0 || cells.len() != size * size * size {
            return Err(invalid_parameter(
                "pattern cells",
                &cells.len(),
                &format!("expected {} colors for edge length {size}", size.pow(3)),
            ));
        }
        Ok(Self { size, cells })
    }

    /// Pattern filled with a single color
    pub fn uniform(size: usize, color: u8) -> Self {
        Self {
            size,
            cells: vec![color; size * size * size],
        }
    }

    /// Edge length
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Color at a local position
    pub fn get(&self, position: [usize; 3]) -> Option<u8> {
        let [x, y, z] = position;
        if x >= self.size || y >= self.size || z >= self.size {
            return None;
        }
        self.cells
            .get((x * self.size + y) * self.size + z)
            .copied()
    }

    /// Color of the origin corner, used as the anchor voxel of a cell
    pub fn origin(&self) -> u8 {
        self.cells.first().copied().unwrap_or(EMPTY_COLOR)
    }

    /// The N x N layer on the side facing `direction`
    pub fn face(&self, direction: Direction) -> Vec<u8> {
        let n = self.size;
        let layer = if direction.is_positive() { n.saturating_sub(1) } else { 0 };
        let mut face = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                let position = match direction.axis() {
                    0 => [layer, a, b],
                    1 => [a, layer, b],
                    _ => [a, b, layer],
                };
                face.push(self.get(position).unwrap_or(EMPTY_COLOR));
            }
        }
        face
    }

    /// Whether `other` can sit against this pattern on the `direction` side
    ///
    /// The face of `self` towards `direction` must equal the face of `other`
    /// towards the opposite direction.
    pub fn fits(&self, other: &Self, direction: Direction) -> bool {
        self.size == other.size && self.face(direction) == other.face(direction.opposite())
    }

    /// Raw colors in x-major order
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// How windows are cut from the sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One window per sample position; patterns overlap
    Overlapping,
    /// Aligned, non-overlapping blocks
    Lattice,
}

/// Deduplicated pattern table with frequencies
///
/// Pattern IDs are assigned in first-seen order while scanning x, then y,
/// then z. The occurrence map records the pattern ID of every window (the
/// block lattice in [`ExtractionMode::Lattice`]).
#[derive(Clone, Debug)]
pub struct PatternLibrary {
    pattern_size: usize,
    mode: ExtractionMode,
    periodic: bool,
    patterns: Vec<Pattern>,
    counts: Vec<usize>,
    frequencies: Vec<f64>,
    occurrences: Array3<usize>,
}

impl PatternLibrary {
    /// Extract patterns from a sample volume
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `pattern_size` is zero or above the supported maximum
    /// - The volume has a zero dimension
    /// - A non-periodic sample is smaller than one window along some axis
    pub fn extract(
        volume: &VoxelVolume,
        pattern_size: usize,
        mode: ExtractionMode,
        periodic: bool,
    ) -> Result<Self> {
        if pattern_size == 0 || pattern_size > MAX_PATTERN_SIZE {
            return Err(invalid_parameter(
                "pattern_size",
                &pattern_size,
                &format!("must be between 1 and {MAX_PATTERN_SIZE}"),
            ));
        }

        let size = volume.size();
        if size.contains(&0) {
            return Err(invalid_source(&format!(
                "sample volume {size:?} has a zero dimension"
            )));
        }

        let windows = match mode {
            ExtractionMode::Overlapping if periodic => size,
            ExtractionMode::Overlapping => {
                if size.iter().any(|&extent| extent < pattern_size) {
                    return Err(invalid_source(&format!(
                        "sample {size:?} is smaller than a {pattern_size}^3 window"
                    )));
                }
                size.map(|extent| extent - pattern_size + 1)
            }
            ExtractionMode::Lattice => size.map(|extent| extent.div_ceil(pattern_size)),
        };
        let stride = match mode {
            ExtractionMode::Overlapping => 1,
            ExtractionMode::Lattice => pattern_size,
        };

        let mut library = Self {
            pattern_size,
            mode,
            periodic,
            patterns: Vec::new(),
            counts: Vec::new(),
            frequencies: Vec::new(),
            occurrences: Array3::zeros((windows[0], windows[1], windows[2])),
        };
        let mut lookup: HashMap<Pattern, usize> = HashMap::new();

        for x in 0..windows[0] {
            for y in 0..windows[1] {
                for z in 0..windows[2] {
                    let origin = [x * stride, y * stride, z * stride];
                    let pattern = read_window(volume, origin, pattern_size, periodic);
                    let id = library.register(&mut lookup, pattern);
                    if let Some(slot) = library.occurrences.get_mut([x, y, z]) {
                        *slot = id;
                    }
                }
            }
        }

        if library.patterns.is_empty() {
            return Err(invalid_source(&"no patterns could be extracted"));
        }

        let total = library.occurrences.len() as f64;
        library.frequencies = library
            .counts
            .iter()
            .map(|&count| count as f64 / total)
            .collect();

        Ok(library)
    }

    /// Build a library from an explicit pattern table
    ///
    /// Weights are normalized into frequencies. The occurrence map lists the
    /// patterns once each along x.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The table is empty or the weight count differs from the pattern count
    /// - Patterns disagree on edge length or repeat
    /// - A weight is not strictly positive
    pub fn from_patterns(patterns: Vec<Pattern>, weights: &[f64]) -> Result<Self> {
        let Some(first) = patterns.first() else {
            return Err(invalid_source(&"pattern table is empty"));
        };
        let pattern_size = first.size();
        if weights.len() != patterns.len() {
            return Err(invalid_parameter(
                "weights",
                &weights.len(),
                &format!("expected one weight per pattern ({})", patterns.len()),
            ));
        }
        if patterns.iter().any(|pattern| pattern.size() != pattern_size) {
            return Err(invalid_source(&"patterns have different edge lengths"));
        }
        let distinct: HashSet<&Pattern> = patterns.iter().collect();
        if distinct.len() != patterns.len() {
            return Err(invalid_source(&"pattern table contains duplicates"));
        }
        if weights.iter().any(|&weight| weight.is_nan() || weight <= 0.0) {
            return Err(invalid_parameter(
                "weights",
                &format!("{weights:?}"),
                &"every pattern needs a positive weight",
            ));
        }

        let total: f64 = weights.iter().sum();
        let count = patterns.len();
        Ok(Self {
            pattern_size,
            mode: ExtractionMode::Lattice,
            periodic: false,
            patterns,
            counts: vec![1; count],
            frequencies: weights.iter().map(|&weight| weight / total).collect(),
            occurrences: Array3::from_shape_fn((count, 1, 1), |(x, _, _)| x),
        })
    }

    fn register(&mut self, lookup: &mut HashMap<Pattern, usize>, pattern: Pattern) -> usize {
        if let Some(&id) = lookup.get(&pattern) {
            if let Some(count) = self.counts.get_mut(id) {
                *count += 1;
            }
            return id;
        }
        let id = self.patterns.len();
        lookup.insert(pattern.clone(), id);
        self.patterns.push(pattern);
        self.counts.push(1);
        id
    }

    /// Edge length of every pattern
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Extraction mode the library was built with
    pub const fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Whether windows wrapped around the sample
    pub const fn periodic(&self) -> bool {
        self.periodic
    }

    /// Number of distinct patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the table is empty (never true for an extracted library)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All patterns in ID order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Pattern by ID
    pub fn pattern(&self, id: usize) -> Option<&Pattern> {
        self.patterns.get(id)
    }

    /// Occurrence count per pattern
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Normalized frequency per pattern
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Frequency of one pattern, 0 for unknown IDs
    pub fn frequency(&self, id: usize) -> f64 {
        self.frequencies.get(id).copied().unwrap_or(0.0)
    }

    /// Pattern ID of every window
    pub const fn occurrences(&self) -> &Array3<usize> {
        &self.occurrences
    }
}

/// Read the NxNxN window whose origin corner is at `origin`
///
/// Positions past the sample wrap when periodic and read as empty otherwise.
fn read_window(volume: &VoxelVolume, origin: [usize; 3], size: usize, periodic: bool) -> Pattern {
    let extent = volume.size();
    let mut cells = Vec::with_capacity(size * size * size);
    for dx in 0..size {
        for dy in 0..size {
            for dz in 0..size {
                let mut position = [origin[0] + dx, origin[1] + dy, origin[2] + dz];
                if periodic {
                    for (component, &bound) in position.iter_mut().zip(extent.iter()) {
                        *component %= bound;
                    }
                }
                cells.push(volume.get(position).unwrap_or(EMPTY_COLOR));
            }
        }
    }
    Pattern { size, cells }
}
