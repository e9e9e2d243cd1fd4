use log::{debug, info, warn};

use crate::algorithm::assembly::assemble_output;
use crate::algorithm::backtrack::{BacktrackManager, RollbackOutcome, RollbackPolicy};
use crate::algorithm::propagation::{PropagationEngine, PropagationOutcome};
use crate::algorithm::selection::{RandomSelector, choose_pattern, select_cell};
use crate::analysis::adjacency::AdjacencyTable;
use crate::analysis::patterns::{ExtractionMode, PatternLibrary};
use crate::analysis::statistics::AdjacencyStatistics;
use crate::io::configuration::{
    DEFAULT_MAX_ROLLBACKS, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    MAX_GRID_DIMENSION, MAX_PATTERN_SIZE,
};
use crate::io::error::{Result, SynthesisError, invalid_parameter, invalid_source};
use crate::spatial::grid::{CellState, WaveGrid};
use crate::spatial::volume::{VoxelSample, VoxelVolume};

/// Parameters controlling pattern extraction and solving
#[derive(Clone, Copy, Debug, PartialEq)]
// Each flag is an independent switch of the model
#[allow(clippy::struct_excessive_bools)]
pub struct SolverConfig {
    /// Edge length N of extracted patterns
    pub pattern_size: usize,
    /// Output grid size in cells (x, y, z)
    pub output_size: [usize; 3],
    /// Wrap the sample and the output grid on every axis
    pub periodic: bool,
    /// Use sliding-window extraction and the overlap model instead of the block lattice
    pub overlapping: bool,
    /// Sample patterns by frequency instead of uniformly
    pub probabilistic: bool,
    /// Add border-matching pairs to lattice adjacency
    pub augment_neighbours: bool,
    /// Rollbacks allowed before a contradiction becomes terminal
    pub max_rollbacks: usize,
    /// Snapshots discarded per rollback
    pub rollback_policy: RollbackPolicy,
    /// Seed of the solver's random source
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pattern_size: DEFAULT_PATTERN_SIZE,
            output_size: DEFAULT_OUTPUT_SIZE,
            periodic: true,
            overlapping: false,
            probabilistic: true,
            augment_neighbours: true,
            max_rollbacks: DEFAULT_MAX_ROLLBACKS,
            rollback_policy: RollbackPolicy::Single,
            seed: DEFAULT_SEED,
        }
    }
}

impl SolverConfig {
    /// Extraction mode selected by the `overlapping` flag
    pub const fn extraction_mode(&self) -> ExtractionMode {
        if self.overlapping {
            ExtractionMode::Overlapping
        } else {
            ExtractionMode::Lattice
        }
    }

    /// Check sizes against the supported limits
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pattern size is zero or above [`MAX_PATTERN_SIZE`]
    /// - Any output dimension is zero or above [`MAX_GRID_DIMENSION`]
    pub fn validate(&self) -> Result<()> {
        if self.pattern_size == 0 || self.pattern_size > MAX_PATTERN_SIZE {
            return Err(invalid_parameter(
                "pattern_size",
                &self.pattern_size,
                &format!("must be between 1 and {MAX_PATTERN_SIZE}"),
            ));
        }
        if self
            .output_size
            .iter()
            .any(|&extent| extent == 0 || extent > MAX_GRID_DIMENSION)
        {
            return Err(invalid_parameter(
                "output_size",
                &format!("{:?}", self.output_size),
                &format!("each dimension must be between 1 and {MAX_GRID_DIMENSION}"),
            ));
        }
        Ok(())
    }
}

/// What a single observation did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A cell was collapsed and propagation settled
    Collapsed {
        /// Collapsed cell
        position: [usize; 3],
        /// Pattern it now holds
        pattern: usize,
    },
    /// Every cell holds exactly one pattern
    Finished,
    /// A contradiction was undone by restoring an earlier snapshot
    RolledBack {
        /// Snapshots popped
        depth: usize,
    },
    /// A contradiction could not be recovered; call [`Solver::clear`] to retry
    Contradiction,
}

/// Progress handed to the [`Solver::generate`] callback after every step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationProgress {
    /// One-based attempt number
    pub attempt: usize,
    /// Observations made in this attempt
    pub generation: usize,
    /// Collapsed cells
    pub collapsed: usize,
    /// Cells in the grid
    pub total: usize,
    /// Outcome of the step just taken
    pub outcome: StepOutcome,
}

/// Result of a successful [`Solver::generate`] run
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Attempts used, including the successful one
    pub attempts: usize,
    /// Observations made by the successful attempt
    pub generations: usize,
    /// Rollbacks performed by the successful attempt
    pub rollbacks: usize,
    /// Assembled voxel volume
    pub volume: VoxelVolume,
}

/// Wave function collapse solver over a 3D pattern grid
///
/// Owns the pattern library, the adjacency table, the wave grid and every
/// piece of mutable search state. One instance runs one generation at a time.
#[derive(Debug)]
pub struct Solver {
    library: PatternLibrary,
    adjacency: AdjacencyTable,
    grid: WaveGrid,
    backtrack: BacktrackManager,
    propagation: PropagationEngine,
    random_selector: RandomSelector,
    config: SolverConfig,
    generation: usize,
    contradiction: bool,
    generation_finished: bool,
}

impl Solver {
    /// Learn patterns and adjacency from a sample and prepare an empty grid
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is out of range
    /// - The sample is degenerate or smaller than a non-periodic window
    pub fn new(sample: &VoxelSample, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        let volume = sample.to_volume()?;
        let library = PatternLibrary::extract(
            &volume,
            config.pattern_size,
            config.extraction_mode(),
            config.periodic,
        )?;
        let adjacency = AdjacencyTable::build(&library, config.periodic, config.augment_neighbours)?;
        Self::from_parts(library, adjacency, config)
    }

    /// Build a solver from a hand-made library and table
    ///
    /// The library's own pattern size takes precedence over
    /// `config.pattern_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output size is out of range
    /// - The library is empty
    /// - The table covers a different number of patterns than the library
    pub fn from_parts(
        library: PatternLibrary,
        adjacency: AdjacencyTable,
        config: SolverConfig,
    ) -> Result<Self> {
        let config = SolverConfig {
            pattern_size: library.pattern_size(),
            ..config
        };
        config.validate()?;
        if library.is_empty() {
            return Err(invalid_source(&"no patterns were extracted"));
        }
        if adjacency.pattern_count() != library.len() {
            return Err(invalid_parameter(
                "adjacency",
                &adjacency.pattern_count(),
                &format!("table must cover all {} patterns", library.len()),
            ));
        }

        let statistics = AdjacencyStatistics::from_table(&adjacency);
        info!(
            "{} patterns of size {}, {} offsets, {:.2} allowed neighbours per slot",
            library.len(),
            library.pattern_size(),
            statistics.offset_count,
            statistics.mean_allowed()
        );
        let isolated = statistics.isolated_patterns();
        if !isolated.is_empty() {
            warn!(
                "{} of {} patterns have no allowed neighbour at some offset",
                isolated.len(),
                library.len()
            );
        }

        let mut solver = Self {
            grid: WaveGrid::new(config.output_size, library.len()),
            library,
            adjacency,
            backtrack: BacktrackManager::new(config.max_rollbacks, config.rollback_policy),
            propagation: PropagationEngine::new(config.periodic),
            random_selector: RandomSelector::new(config.seed),
            config,
            generation: 0,
            contradiction: false,
            generation_finished: false,
        };
        solver.settle_initial_state();
        Ok(solver)
    }

    // A grid that starts fully collapsed is only finished if the table accepts it
    fn settle_initial_state(&mut self) {
        self.contradiction = false;
        self.generation_finished = false;
        if !self.grid.is_fully_collapsed() {
            return;
        }
        match self
            .propagation
            .first_inconsistency(&self.grid, &self.adjacency)
        {
            Some(cell) => {
                warn!("initial grid violates adjacency at {cell:?}, no output is possible");
                self.contradiction = true;
            }
            None => self.generation_finished = true,
        }
    }

    /// Collapse one cell and propagate the consequences
    ///
    /// A finished or terminally contradicted solver reports its state without
    /// changing anything.
    pub fn observe(&mut self) -> StepOutcome {
        if self.generation_finished {
            return StepOutcome::Finished;
        }
        if self.contradiction {
            return StepOutcome::Contradiction;
        }

        if !self.backtrack.take_rolling_back() {
            self.backtrack.push_snapshot(&self.grid);
        }
        self.generation += 1;

        let collapsible = self.grid.collapsible_cells();
        if collapsible.is_empty() {
            if self.grid.is_fully_collapsed() {
                self.generation_finished = true;
                return StepOutcome::Finished;
            }
            let stuck = self.first_contradicted_cell();
            return self.handle_contradiction(stuck);
        }

        let Some(cell) = select_cell(
            &collapsible,
            self.backtrack.chosen_points(),
            &mut self.random_selector,
        ) else {
            return self.handle_contradiction([0, 0, 0]);
        };
        let Some(domain) = self.grid.domain(cell).cloned() else {
            return self.handle_contradiction(cell);
        };
        let Some(pattern) = choose_pattern(
            &domain,
            self.library.frequencies(),
            self.config.probabilistic,
            &mut self.random_selector,
        ) else {
            return self.handle_contradiction(cell);
        };

        if !self.grid.collapse(cell, pattern) {
            return self.handle_contradiction(cell);
        }
        match self
            .propagation
            .propagate(&mut self.grid, &self.adjacency, cell)
        {
            PropagationOutcome::Settled { finished, .. } => {
                self.backtrack.clear_chosen_points();
                if finished {
                    self.generation_finished = true;
                    StepOutcome::Finished
                } else {
                    StepOutcome::Collapsed {
                        position: cell,
                        pattern,
                    }
                }
            }
            PropagationOutcome::Contradiction { seed, .. } => self.handle_contradiction(seed),
        }
    }

    /// Return to the freshly constructed state, keeping the random stream
    pub fn clear(&mut self) {
        self.grid.reset();
        self.backtrack.reset();
        self.generation = 0;
        self.settle_initial_state();
    }

    /// Observe repeatedly, clearing and retrying after terminal contradictions
    ///
    /// `on_step` runs after every observation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_attempts` is zero
    /// - Every attempt ends in a terminal contradiction
    pub fn generate<F>(&mut self, max_attempts: usize, mut on_step: F) -> Result<GenerationReport>
    where
        F: FnMut(&GenerationProgress),
    {
        if max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &max_attempts,
                &"at least one attempt is required",
            ));
        }

        let mut total_generations = 0;
        for attempt in 1..=max_attempts {
            loop {
                let outcome = self.observe();
                on_step(&GenerationProgress {
                    attempt,
                    generation: self.generation,
                    collapsed: self.grid.collapsed_count(),
                    total: self.grid.cell_count(),
                    outcome,
                });
                match outcome {
                    StepOutcome::Finished => {
                        info!(
                            "generation finished after {} observations on attempt {attempt}",
                            self.generation
                        );
                        return Ok(GenerationReport {
                            attempts: attempt,
                            generations: self.generation,
                            rollbacks: self.backtrack.rollbacks(),
                            volume: self.output()?,
                        });
                    }
                    StepOutcome::Contradiction => break,
                    StepOutcome::Collapsed { .. } | StepOutcome::RolledBack { .. } => {}
                }
            }
            total_generations += self.generation;
            if attempt < max_attempts {
                self.clear();
            }
        }

        Err(SynthesisError::GenerationFailed {
            attempts: max_attempts,
            generations: total_generations,
        })
    }

    /// Assemble the voxel volume of a finished grid
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not fully collapsed
    pub fn output(&self) -> Result<VoxelVolume> {
        assemble_output(&self.grid, &self.library)
    }

    /// Whether every cell holds exactly one pattern
    pub const fn is_generation_finished(&self) -> bool {
        self.generation_finished
    }

    /// Whether the solver hit a terminal contradiction
    pub const fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    /// Observations made since construction or the last clear
    pub const fn generation(&self) -> usize {
        self.generation
    }

    /// Rollbacks performed since construction or the last clear
    pub const fn rollback_count(&self) -> usize {
        self.backtrack.rollbacks()
    }

    /// Snapshots currently held for rollback
    pub fn snapshot_depth(&self) -> usize {
        self.backtrack.depth()
    }

    /// Extracted patterns
    pub const fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Compatibility table
    pub const fn adjacency(&self) -> &AdjacencyTable {
        &self.adjacency
    }

    /// Current wave grid
    pub const fn grid(&self) -> &WaveGrid {
        &self.grid
    }

    /// Active configuration
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn handle_contradiction(&mut self, seed: [usize; 3]) -> StepOutcome {
        match self
            .backtrack
            .rollback(&mut self.grid, seed, &mut self.random_selector)
        {
            RollbackOutcome::Restored { depth } => {
                debug!(
                    "contradiction from {seed:?}, rolled back {depth} step(s) ({} of {})",
                    self.backtrack.rollbacks(),
                    self.backtrack.max_rollbacks()
                );
                StepOutcome::RolledBack { depth }
            }
            outcome @ (RollbackOutcome::Exhausted | RollbackOutcome::NoSnapshot) => {
                self.contradiction = true;
                warn!(
                    "terminal contradiction from {seed:?} after {} observations ({outcome:?})",
                    self.generation
                );
                StepOutcome::Contradiction
            }
        }
    }

    fn first_contradicted_cell(&self) -> [usize; 3] {
        let [gx, gy, gz] = self.grid.dimensions();
        (0..gx)
            .flat_map(|x| (0..gy).flat_map(move |y| (0..gz).map(move |z| [x, y, z])))
            .find(|&cell| self.grid.state(cell) == Some(CellState::Contradiction))
            .unwrap_or_default()
    }
}
