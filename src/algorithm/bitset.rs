use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset of pattern IDs
///
/// Used both for cell domains and for adjacency allowed-sets. IDs are 0-based
/// indices into the pattern table; membership tests are O(1) and set
/// operations work a machine word at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternBitset {
    bits: BitVec,
}

impl PatternBitset {
    /// Create a bitset with no patterns present
    pub fn new(pattern_count: usize) -> Self {
        Self {
            bits: bitvec![0; pattern_count],
        }
    }

    /// Create a bitset containing every pattern
    pub fn all(pattern_count: usize) -> Self {
        Self {
            bits: bitvec![1; pattern_count],
        }
    }

    /// Create a bitset holding exactly one pattern
    pub fn single(pattern_count: usize, pattern: usize) -> Self {
        let mut bitset = Self::new(pattern_count);
        bitset.insert(pattern);
        bitset
    }

    /// Number of pattern IDs this set can hold
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a pattern ID, ignoring IDs beyond the capacity
    pub fn insert(&mut self, pattern: usize) {
        if pattern < self.bits.len() {
            self.bits.set(pattern, true);
        }
    }

    /// Remove a pattern ID
    pub fn remove(&mut self, pattern: usize) {
        if pattern < self.bits.len() {
            self.bits.set(pattern, false);
        }
    }

    /// Test pattern membership
    pub fn contains(&self, pattern: usize) -> bool {
        self.bits.get(pattern).as_deref() == Some(&true)
    }

    /// Intersect this bitset with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Add every member of another bitset in-place
    pub fn union_with(&mut self, other: &Self) {
        self.bits |= &other.bits;
    }

    /// Create a new bitset containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Remove every member
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Replace the contents with a single pattern
    pub fn collapse_to(&mut self, pattern: usize) {
        self.clear();
        self.insert(pattern);
    }

    /// Test if no patterns are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count patterns in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// The only member, if the set holds exactly one pattern
    pub fn sole(&self) -> Option<usize> {
        let mut ones = self.bits.iter_ones();
        let first = ones.next()?;
        ones.next().is_none().then_some(first)
    }

    /// Test whether every member is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.iter_ones().all(|pattern| other.contains(pattern))
    }

    /// Iterate over members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all pattern IDs as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Build a bitset from a list of IDs
    pub fn from_ids(ids: &[usize], pattern_count: usize) -> Self {
        let mut bitset = Self::new(pattern_count);
        for &pattern in ids {
            bitset.insert(pattern);
        }
        bitset
    }
}

impl fmt::Display for PatternBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternBitset({} patterns: {:?})", self.count(), self.to_vec())
    }
}
