//! Spatial data structures
//!
//! Integer coordinates and directions, the wave grid of candidate domains,
//! and the sparse and dense voxel containers.

/// Coordinates and axis directions
pub mod coord;
/// Wave grid of per-cell pattern domains
pub mod grid;
/// Voxel samples and dense volumes
pub mod volume;

pub use grid::WaveGrid;
