//! Wave function collapse synthesis of 3D voxel models
//!
//! Patterns are extracted from a small voxel sample, adjacency rules are
//! inferred between them, and a seeded solver collapses an output grid one
//! cell at a time with constraint propagation and bounded rollback.

#![forbid(unsafe_code)]

/// Solver core including selection, propagation and rollback
pub mod algorithm;
/// Pattern extraction and adjacency inference
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Mathematical utilities for rollback depth sampling
pub mod math;
/// Coordinates, wave grid and voxel containers
pub mod spatial;

pub use algorithm::executor::{Solver, SolverConfig, StepOutcome};
pub use io::error::{Result, SynthesisError};
