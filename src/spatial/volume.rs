//! Voxel samples handed over by loaders and dense voxel volumes
//!
//! A [`VoxelSample`] is the sparse form a file loader produces: a bounding size
//! plus the list of filled voxels. The solver works on the dense
//! [`VoxelVolume`], one color index per coordinate with 0 meaning empty.

use crate::io::error::{Result, invalid_source};
use ndarray::Array3;

/// Color index of an empty voxel
pub const EMPTY_COLOR: u8 = 0;

/// Single filled voxel with byte-range coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Voxel {
    /// X position
    pub x: u8,
    /// Y position (up)
    pub y: u8,
    /// Z position
    pub z: u8,
    /// Palette color index
    pub color: u8,
}

impl Voxel {
    /// Create a voxel
    pub const fn new(x: u8, y: u8, z: u8, color: u8) -> Self {
        Self { x, y, z, color }
    }
}

/// Decoded sample: bounding size plus the filled voxels
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelSample {
    size: [usize; 3],
    voxels: Vec<Voxel>,
}

impl VoxelSample {
    /// Create a sample from its bounding size and voxels
    pub const fn new(size: [usize; 3], voxels: Vec<Voxel>) -> Self {
        Self { size, voxels }
    }

    /// Bounding size (x, y, z)
    pub const fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Filled voxels
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Rasterize into a dense volume
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any bounding dimension is zero
    /// - The sample has no voxels
    /// - A voxel lies outside the bounding size
    pub fn to_volume(&self) -> Result<VoxelVolume> {
        if self.size.contains(&0) {
            return Err(invalid_source(&format!(
                "sample bounds {:?} have a zero dimension",
                self.size
            )));
        }
        if self.voxels.is_empty() {
            return Err(invalid_source(&"sample contains no voxels"));
        }

        let mut volume = VoxelVolume::empty(self.size);
        for voxel in &self.voxels {
            let position = [voxel.x as usize, voxel.y as usize, voxel.z as usize];
            if !volume.set(position, voxel.color) {
                return Err(invalid_source(&format!(
                    "voxel at {position:?} lies outside sample bounds {:?}",
                    self.size
                )));
            }
        }
        Ok(volume)
    }
}

/// Dense grid of color indices
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelVolume {
    colors: Array3<u8>,
}

impl VoxelVolume {
    /// Create a volume of empty voxels
    pub fn empty(size: [usize; 3]) -> Self {
        Self {
            colors: Array3::from_elem((size[0], size[1], size[2]), EMPTY_COLOR),
        }
    }

    /// Wrap an existing color array
    pub const fn from_array(colors: Array3<u8>) -> Self {
        Self { colors }
    }

    /// Extent along each axis
    pub fn size(&self) -> [usize; 3] {
        let (x, y, z) = self.colors.dim();
        [x, y, z]
    }

    /// Color at a position, `None` outside the volume
    pub fn get(&self, position: [usize; 3]) -> Option<u8> {
        self.colors.get(position).copied()
    }

    /// Write a color, returning false when the position is outside the volume
    pub fn set(&mut self, position: [usize; 3], color: u8) -> bool {
        self.colors.get_mut(position).is_some_and(|cell| {
            *cell = color;
            true
        })
    }

    /// Borrow the underlying array
    pub const fn colors(&self) -> &Array3<u8> {
        &self.colors
    }

    /// Non-empty voxels in x-major order
    ///
    /// Positions beyond the byte range are skipped; callers writing `.vox`
    /// files check the size limit beforehand.
    pub fn to_voxels(&self) -> Vec<Voxel> {
        self.colors
            .indexed_iter()
            .filter(|&(_, &color)| color != EMPTY_COLOR)
            .filter_map(|((x, y, z), &color)| {
                Some(Voxel::new(
                    u8::try_from(x).ok()?,
                    u8::try_from(y).ok()?,
                    u8::try_from(z).ok()?,
                    color,
                ))
            })
            .collect()
    }

    /// Number of non-empty voxels
    pub fn filled_count(&self) -> usize {
        self.colors.iter().filter(|&&color| color != EMPTY_COLOR).count()
    }
}
