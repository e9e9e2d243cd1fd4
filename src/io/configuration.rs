//! Solver constants and runtime configuration defaults

/// Edge length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 2;

/// Output grid size in cells (x, y, z)
pub const DEFAULT_OUTPUT_SIZE: [usize; 3] = [5, 5, 5];

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

// Bounds worst-case retries of a single attempt
/// Rollbacks allowed before a contradiction becomes terminal
pub const DEFAULT_MAX_ROLLBACKS: usize = 50;

/// Clear-and-retry attempts made by the generation loop
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Mean rollback depth as a fraction of the snapshot stack
pub const ROLLBACK_DEPTH_MEAN_FRACTION: f64 = 2.0 / 3.0;

/// Standard deviation of rollback depth as a fraction of the snapshot stack
pub const ROLLBACK_DEPTH_STD_FRACTION: f64 = 1.0 / 3.0;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output grid dimension
pub const MAX_GRID_DIMENSION: usize = 512;

// The overlap model keys (2N-1)^3 offsets per pattern pair
/// Maximum allowed pattern edge length
pub const MAX_PATTERN_SIZE: usize = 8;

/// Largest extent a `.vox` model can have along one axis
pub const MAX_VOX_DIMENSION: usize = 256;

/// Version number written into `.vox` headers
pub const VOX_VERSION: u32 = 150;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Extension of sample and result files
pub const VOX_EXTENSION: &str = "vox";
