//! Tests for lattice, border-match and overlap adjacency construction

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use voxsynth::SynthesisError;
    use voxsynth::analysis::adjacency::{AdjacencyTable, Neighbourhood};
    use voxsynth::analysis::patterns::{ExtractionMode, Pattern, PatternLibrary};
    use voxsynth::spatial::coord::{Coord3, Direction};
    use voxsynth::spatial::volume::VoxelVolume;

    fn striped_library(periodic: bool) -> PatternLibrary {
        // Blocks along x: 1, 2, 3
        let colors: Vec<u8> = (0..6).map(|x| [1, 1, 2, 2, 3, 3][x]).collect();
        let sample = VoxelVolume::from_array(
            Array3::from_shape_vec((6, 1, 1), colors).expect("shape matches"),
        );
        PatternLibrary::extract(&sample, 1, ExtractionMode::Lattice, periodic)
            .expect("valid sample")
    }

    fn assert_reversible(table: &AdjacencyTable) {
        let count = table.pattern_count();
        for a in 0..count {
            for b in 0..count {
                for &offset in table.offsets() {
                    assert_eq!(
                        table.is_compatible(a, offset, b),
                        table.is_compatible(b, -offset, a),
                        "pair ({a}, {b}) at {offset}"
                    );
                }
            }
        }
    }

    // Tests axis offsets follow the fixed direction order
    // Verified by reordering the direction constants
    #[test]
    fn test_axis_offsets_and_indices() {
        let offsets = Neighbourhood::Axis.offsets();
        assert_eq!(offsets.len(), 6);
        assert_eq!(offsets.first(), Some(&Coord3::new(1, 0, 0)));
        assert_eq!(offsets.get(3), Some(&Coord3::new(0, -1, 0)));
        for direction in Direction::ALL {
            assert_eq!(
                Neighbourhood::Axis.offset_index(direction.offset()),
                Some(direction.index())
            );
        }
        assert_eq!(Neighbourhood::Axis.offset_index(Coord3::new(1, 1, 0)), None);
    }

    // Tests overlap offsets cover the cube and index back to their column
    // Verified by using radius + 1 as the index bias
    #[test]
    fn test_overlap_offsets_and_indices() {
        let neighbourhood = Neighbourhood::Overlap { radius: 1 };
        let offsets = neighbourhood.offsets();
        assert_eq!(offsets.len(), 27);
        for (column, &offset) in offsets.iter().enumerate() {
            assert_eq!(neighbourhood.offset_index(offset), Some(column));
        }
        assert_eq!(neighbourhood.offset_index(Coord3::new(2, 0, 0)), None);
    }

    // Tests lattice co-occurrence records observed neighbours only
    // Verified by recording neighbours in the opposite direction
    #[test]
    fn test_lattice_adjacency_bounded() {
        let library = striped_library(false);
        let table = AdjacencyTable::from_lattice(&library, false).expect("valid occurrences");
        let right = Direction::Right.offset();

        assert!(table.is_compatible(0, right, 1));
        assert!(table.is_compatible(1, right, 2));
        assert!(!table.is_compatible(0, right, 2));
        assert!(!table.is_compatible(2, right, 0));
        assert!(!table.is_compatible(0, Direction::Up.offset(), 0));
        assert_reversible(&table);
    }

    // Tests periodic lattice adjacency wraps around the sample edges
    // Verified by skipping out-of-range neighbours in periodic mode
    #[test]
    fn test_lattice_adjacency_periodic() {
        let library = striped_library(true);
        let table = AdjacencyTable::from_lattice(&library, true).expect("valid occurrences");

        assert!(table.is_compatible(2, Direction::Right.offset(), 0));
        assert!(table.is_compatible(0, Direction::Left.offset(), 2));
        assert!(table.is_compatible(1, Direction::Up.offset(), 1));
        assert_reversible(&table);
    }

    // Tests border augmentation adds pairs with matching faces
    // Verified by comparing faces in the same direction
    #[test]
    fn test_border_match_augmentation() {
        let a = Pattern::from_cells(2, vec![0, 0, 0, 0, 7, 7, 7, 7]).expect("eight cells");
        let b = Pattern::from_cells(2, vec![7, 7, 7, 7, 1, 1, 1, 1]).expect("eight cells");
        let library = PatternLibrary::from_patterns(vec![a, b], &[1.0, 1.0]).expect("distinct");
        let mut table = AdjacencyTable::empty(2, Neighbourhood::Axis);

        table.augment_with_border_matches(&library);

        assert!(table.is_compatible(0, Direction::Right.offset(), 1));
        assert!(table.is_compatible(1, Direction::Left.offset(), 0));
        assert!(!table.is_compatible(1, Direction::Right.offset(), 0));
        assert_reversible(&table);
    }

    // Tests build chooses the overlap model for overlapping libraries
    // Verified by dispatching every library to the lattice scan
    #[test]
    fn test_build_dispatches_on_mode() {
        let sample = VoxelVolume::from_array(Array3::from_elem((3, 3, 3), 4));
        let overlapping = PatternLibrary::extract(&sample, 2, ExtractionMode::Overlapping, true)
            .expect("valid sample");
        let table = AdjacencyTable::build(&overlapping, true, true).expect("table");
        assert_eq!(table.neighbourhood(), Neighbourhood::Overlap { radius: 1 });
        assert_eq!(table.offsets().len(), 27);

        let lattice = striped_library(true);
        let table = AdjacencyTable::build(&lattice, true, false).expect("table");
        assert_eq!(table.neighbourhood(), Neighbourhood::Axis);
    }

    // Tests overlap agreement on shifted copies of a gradient
    // Verified by comparing pattern cells without the offset shift
    #[test]
    fn test_overlap_adjacency() {
        // Colors increase along x, so shifting by one in x matches exactly
        let colors: Vec<u8> = (0..27).map(|index| (index / 9) as u8 + 1).collect();
        let sample = VoxelVolume::from_array(
            Array3::from_shape_vec((3, 3, 3), colors).expect("shape matches"),
        );
        let library = PatternLibrary::extract(&sample, 2, ExtractionMode::Overlapping, false)
            .expect("valid sample");
        let table = AdjacencyTable::from_overlaps(&library);

        // Pattern 0 holds x colors [1, 2], pattern 1 holds [2, 3]
        assert_eq!(library.len(), 2);
        assert!(table.is_compatible(0, Coord3::new(1, 0, 0), 1));
        assert!(!table.is_compatible(0, Coord3::new(-1, 0, 0), 1));
        assert!(table.is_compatible(1, Coord3::new(-1, 0, 0), 0));
        assert!(table.is_compatible(0, Coord3::new(0, 1, 0), 0));
        assert!(!table.is_compatible(0, Coord3::ZERO, 1));
        assert!(table.is_compatible(0, Coord3::new(1, 1, 1), 1));
        assert_reversible(&table);
    }

    // Tests explicit pairs are added in both directions and validated
    // Verified by omitting the reverse insertion
    #[test]
    fn test_allow_pair() {
        let mut table = AdjacencyTable::empty(2, Neighbourhood::Axis);
        table
            .allow_pair(0, Direction::Forward, 1)
            .expect("pattern IDs are in range");

        assert!(table.is_compatible(0, Direction::Forward.offset(), 1));
        assert!(table.is_compatible(1, Direction::Back.offset(), 0));
        assert_eq!(
            table.allowed(1, Direction::Back.index()).map(|set| set.to_vec()),
            Some(vec![0])
        );
        assert!(matches!(
            table.allow_pair(0, Direction::Up, 5),
            Err(SynthesisError::InvalidPatternIndex { index: 5, .. })
        ));

        let mut overlap = AdjacencyTable::empty(2, Neighbourhood::Overlap { radius: 1 });
        assert!(overlap.allow_pair(0, Direction::Up, 1).is_err());
        assert_eq!(overlap.sets().dim(), (2, 27));
    }
}
