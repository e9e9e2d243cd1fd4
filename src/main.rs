//! CLI entry point for voxel model synthesis

use clap::Parser;
use voxsynth::io::cli::{Cli, FileProcessor};

fn main() -> voxsynth::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut processor = FileProcessor::new(cli);
    processor.process()
}
