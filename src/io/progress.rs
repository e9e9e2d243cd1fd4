//! Multi-file progress tracking with automatic batching for large sets

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Display state of one file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileState {
    /// Name shown next to the bar
    pub name: String,
    /// Collapsed cells
    pub collapsed: usize,
    /// Cells in the output grid
    pub total: usize,
    /// Current attempt, zero before the first observation
    pub attempt: usize,
}

/// Coordinates progress display for batch operations
///
/// Shows one bar per file for small batches and adds a file counter bar for
/// large ones; the per-file bars then cycle through the most recent files.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    file_states: Vec<FileState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static CELL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            file_states: Vec::new(),
        }
    }

    /// Create the bars for a batch of `file_count` files
    pub fn initialize(&mut self, file_count: usize) {
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(CELL_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Register a file whose output grid has `total_cells` cells
    pub fn start_file(&mut self, index: usize, path: &Path, total_cells: usize) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.file_states.len() {
            self.file_states.resize(index + 1, FileState::default());
        }
        if let Some(state) = self.file_states.get_mut(index) {
            *state = FileState {
                name,
                collapsed: 0,
                total: total_cells,
                attempt: 0,
            };
        }
        self.update_bars();
    }

    /// Report collapsed cells of the running attempt
    pub fn update_cells(&mut self, index: usize, collapsed: usize, attempt: usize) {
        if let Some(state) = self.file_states.get_mut(index) {
            state.collapsed = collapsed;
            state.attempt = attempt;
        }
        self.update_bars();
    }

    /// Mark a file as done
    pub fn complete_file(&mut self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(state) = self.file_states.get_mut(index) {
            state.name = format!("✓ {}", state.name);
            state.collapsed = state.total;
        }
        self.update_bars();
    }

    /// Display state of a file
    pub fn file_state(&self, index: usize) -> Option<&FileState> {
        self.file_states.get(index)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }

    fn update_bars(&self) {
        let active: Vec<&FileState> = self
            .file_states
            .iter()
            .filter(|state| !state.name.is_empty())
            .collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, state) in self.file_bars.iter().zip(visible) {
            bar.set_length(state.total as u64);
            bar.set_position(state.collapsed as u64);
            let width = state.total.to_string().len();
            bar.set_message(format!(
                "{:>width$}/{} #{}",
                state.collapsed, state.total, state.attempt
            ));
            bar.set_prefix(state.name.clone());
        }

        for bar in self.file_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}
