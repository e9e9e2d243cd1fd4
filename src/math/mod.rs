//! Mathematical utilities for the solver

/// Rollback depth clamping
pub mod probability;
