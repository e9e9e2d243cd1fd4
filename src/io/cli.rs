//! Command-line interface for batch synthesis of `.vox` samples

use crate::algorithm::backtrack::RollbackPolicy;
use crate::algorithm::executor::{Solver, SolverConfig};
use crate::io::configuration::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ROLLBACKS, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    OUTPUT_SUFFIX, VOX_EXTENSION,
};
use crate::io::error::{Result, WithPath, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::io::vox::{read_vox_file, write_vox_file};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Rollback depth policy as named on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RollbackArg {
    /// Undo one observation per contradiction
    Single,
    /// Undo a normally distributed number of observations
    Normal,
}

impl From<RollbackArg> for RollbackPolicy {
    fn from(arg: RollbackArg) -> Self {
        match arg {
            RollbackArg::Single => Self::Single,
            RollbackArg::Normal => Self::NormalDepth,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "voxsynth")]
#[command(
    author,
    version,
    about = "Synthesize voxel models from a sample using wave function collapse"
)]
/// Command-line arguments for the voxel synthesis tool
// Every model switch is an independent flag
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input .vox file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Directory for results (defaults to next to each input)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Edge length of extracted patterns
    #[arg(short = 'n', long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Output grid size in cells, as XxYxZ or X,Y,Z
    #[arg(long, value_parser = parse_size, default_value = "5x5x5")]
    pub size: [usize; 3],

    /// Treat sample and output as bounded instead of wrapping
    #[arg(long)]
    pub bounded: bool,

    /// Use sliding-window patterns with overlap adjacency
    #[arg(long)]
    pub overlapping: bool,

    /// Pick patterns uniformly instead of by frequency
    #[arg(long)]
    pub uniform: bool,

    /// Skip adding border-matching neighbour pairs
    #[arg(long)]
    pub no_augment: bool,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Rollbacks allowed per attempt before it is abandoned
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ROLLBACKS)]
    pub max_rollbacks: usize,

    /// How many observations a rollback undoes
    #[arg(long, value_enum, default_value_t = RollbackArg::Single)]
    pub rollback_policy: RollbackArg,

    /// Clear-and-retry attempts per file
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Solver configuration selected by the flags
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            pattern_size: self.pattern_size,
            output_size: self.size,
            periodic: !self.bounded,
            overlapping: self.overlapping,
            probabilistic: !self.uniform,
            augment_neighbours: !self.no_augment,
            max_rollbacks: self.max_rollbacks,
            rollback_policy: self.rollback_policy.into(),
            seed: self.seed,
        }
    }

    /// Where the result for `input_path` is written
    pub fn output_path(&self, input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}.{VOX_EXTENSION}", stem.to_string_lossy());

        match (&self.output, input_path.parent()) {
            (Some(directory), _) => directory.join(output_name),
            (None, Some(parent)) => parent.join(output_name),
            (None, None) => PathBuf::from(output_name),
        }
    }
}

/// Parse an output size written as `XxYxZ` or `X,Y,Z`
///
/// # Errors
///
/// Returns a message if there are not exactly three positive integers
pub fn parse_size(text: &str) -> std::result::Result<[usize; 3], String> {
    let parts: Vec<&str> = text
        .split(|c: char| c == 'x' || c == 'X' || c == ',')
        .map(str::trim)
        .collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected three dimensions like 5x5x5, got '{text}'"));
    };

    let mut size = [0; 3];
    for (slot, part) in size.iter_mut().zip([x, y, z]) {
        *slot = part
            .parse::<usize>()
            .map_err(|error| format!("invalid dimension '{part}': {error}"))?;
        if *slot == 0 {
            return Err(format!("dimensions must be positive, got '{text}'"));
        }
    }
    Ok(size)
}

/// Orchestrates batch processing of `.vox` files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref output) = self.cli.output {
            std::fs::create_dir_all(output).with_path(output, "create directory")?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Input files the target resolves to, sorted and minus skipped ones
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a `.vox` file nor a readable
    /// directory
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !has_vox_extension(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"file must have a .vox extension",
                ));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                vec![]
            })
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).with_path(target, "read directory")? {
                let path = entry.with_path(target, "read directory entry")?.path();
                if has_vox_extension(&path)
                    && !is_result_file(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be a .vox file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = self.cli.output_path(input_path);
        if output_path.exists() {
            info!("skipping {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();
        let output_path = self.cli.output_path(input_path);

        let sample = read_vox_file(input_path)?;
        let mut solver = Solver::new(&sample, self.cli.solver_config())?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, solver.grid().cell_count());
        }

        let progress_manager = &mut self.progress_manager;
        let report = solver.generate(self.cli.attempts, |progress| {
            if let Some(pm) = progress_manager.as_mut() {
                pm.update_cells(index, progress.collapsed, progress.attempt);
            }
        })?;

        write_vox_file(&output_path, &report.volume)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        info!(
            "{} -> {} in {:.2?} ({} attempt(s), {} observations, {} rollbacks, {} voxels)",
            input_path.display(),
            output_path.display(),
            start_time.elapsed(),
            report.attempts,
            report.generations,
            report.rollbacks,
            report.volume.filled_count()
        );

        Ok(())
    }
}

fn has_vox_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(VOX_EXTENSION))
}

fn is_result_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
