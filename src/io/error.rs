//! Error types and context management for synthesis operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all synthesis operations
#[derive(Debug)]
pub enum SynthesisError {
    /// Sample bytes are not a readable `.vox` document
    VoxFormat {
        /// Description of the malformed content
        reason: String,
    },

    /// Source data doesn't meet algorithm requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Solver parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Pattern index exceeds the pattern table
    InvalidPatternIndex {
        /// The invalid pattern index
        index: usize,
        /// Number of patterns in the table
        pattern_count: usize,
    },

    /// Output requested before every cell collapsed
    GenerationIncomplete {
        /// Cells holding exactly one candidate
        collapsed: usize,
        /// Total cells in the wave grid
        total: usize,
    },

    /// Every generation attempt ended in a contradiction
    GenerationFailed {
        /// Number of attempts made
        attempts: usize,
        /// Observe calls made across all attempts
        generations: usize,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VoxFormat { reason } => write!(f, "Malformed vox data: {reason}"),
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidPatternIndex {
                index,
                pattern_count,
            } => {
                write!(
                    f,
                    "Pattern index {index} is out of bounds ({pattern_count} patterns)"
                )
            }
            Self::GenerationIncomplete { collapsed, total } => {
                write!(
                    f,
                    "Generation is not finished ({collapsed} of {total} cells collapsed)"
                )
            }
            Self::GenerationFailed {
                attempts,
                generations,
            } => {
                write!(
                    f,
                    "Generation failed after {attempts} attempts ({generations} observations)"
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for synthesis results
pub type Result<T> = std::result::Result<T, SynthesisError>;

impl From<std::io::Error> for SynthesisError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Attaches the path and operation to failed file system calls
pub trait WithPath<T> {
    /// Wrap an I/O failure with the file it concerned
    ///
    /// # Errors
    ///
    /// Propagates the original error as [`SynthesisError::FileSystem`]
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| SynthesisError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SynthesisError {
    SynthesisError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid source data error
pub fn invalid_source(reason: &impl ToString) -> SynthesisError {
    SynthesisError::InvalidSourceData {
        reason: reason.to_string(),
    }
}

/// Create a vox format error
pub fn vox_format(reason: &impl ToString) -> SynthesisError {
    SynthesisError::VoxFormat {
        reason: reason.to_string(),
    }
}
