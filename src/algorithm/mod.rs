//! Solver core: observation, propagation and rollback

/// Output volume assembly from a collapsed grid
pub mod assembly;
/// Snapshot stack and bounded rollback
pub mod backtrack;
/// Fixed-capacity bitset of pattern IDs
pub mod bitset;
/// Solver orchestration and the generation loop
pub mod executor;
/// Breadth-first constraint propagation
pub mod propagation;
/// Seeded cell and pattern selection
pub mod selection;
