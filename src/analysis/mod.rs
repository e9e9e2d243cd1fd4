//! Analysis modules for pattern extraction and adjacency inference

/// Compatibility tables between patterns
pub mod adjacency;
/// Pattern extraction from voxel volumes
pub mod patterns;
/// Summary statistics of adjacency tables
pub mod statistics;
