use crate::analysis::patterns::{ExtractionMode, PatternLibrary};
use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::spatial::coord::Coord3;
use crate::spatial::grid::WaveGrid;
use crate::spatial::volume::VoxelVolume;

/// Voxel extent produced for a grid of the given size
///
/// Lattice cells expand to full blocks; overlapping cells contribute one voxel.
pub fn output_size(grid_size: [usize; 3], library: &PatternLibrary) -> [usize; 3] {
    match library.mode() {
        ExtractionMode::Lattice => grid_size.map(|extent| extent * library.pattern_size()),
        ExtractionMode::Overlapping => grid_size,
    }
}

/// Convert a fully collapsed grid into a dense voxel volume
///
/// # Errors
///
/// Returns an error if:
/// - Some cell is not collapsed
/// - A collapsed cell references a pattern missing from the library
pub fn assemble_output(grid: &WaveGrid, library: &PatternLibrary) -> Result<VoxelVolume> {
    if !grid.is_fully_collapsed() {
        return Err(SynthesisError::GenerationIncomplete {
            collapsed: grid.collapsed_count(),
            total: grid.cell_count(),
        });
    }

    let n = library.pattern_size();
    let mut volume = VoxelVolume::empty(output_size(grid.dimensions(), library));
    let [gx, gy, gz] = grid.dimensions();

    for x in 0..gx {
        for y in 0..gy {
            for z in 0..gz {
                let cell = [x, y, z];
                let id = grid.collapsed_pattern(cell).unwrap_or(usize::MAX);
                let pattern = library.pattern(id).ok_or(SynthesisError::InvalidPatternIndex {
                    index: id,
                    pattern_count: library.len(),
                })?;

                match library.mode() {
                    ExtractionMode::Overlapping => {
                        place(&mut volume, Coord3::from_index(cell), pattern.origin())?;
                    }
                    ExtractionMode::Lattice => {
                        let block = Coord3::from_index(cell).scale(n as i32);
                        for px in 0..n {
                            for py in 0..n {
                                for pz in 0..n {
                                    let local = [px, py, pz];
                                    let color = pattern.get(local).unwrap_or_default();
                                    place(&mut volume, block + Coord3::from_index(local), color)?;
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(volume)
}

fn place(volume: &mut VoxelVolume, position: Coord3, color: u8) -> Result<()> {
    let size = volume.size();
    match position.to_index(size) {
        Some(index) if volume.set(index, color) => Ok(()),
        _ => Err(invalid_parameter(
            "output position",
            &position,
            &format!("outside the assembled volume of size {size:?}"),
        )),
    }
}
