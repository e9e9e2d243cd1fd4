//! Input/output, configuration and error handling

/// Command-line interface and batch processing
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error type and result alias
pub mod error;
/// Terminal progress bars
pub mod progress;
/// MagicaVoxel file codec
pub mod vox;
