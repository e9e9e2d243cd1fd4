//! Tests for command-line interface parsing and file processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::fs;
    use std::path::{Path, PathBuf};
    use voxsynth::SynthesisError;
    use voxsynth::algorithm::backtrack::RollbackPolicy;
    use voxsynth::io::cli::{Cli, FileProcessor, parse_size};
    use voxsynth::io::configuration::{
        DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_ROLLBACKS, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    };
    use voxsynth::io::vox::{read_vox_file, write_vox_file};
    use voxsynth::spatial::volume::VoxelVolume;

    fn write_layered_sample(path: &Path) {
        let mut volume = VoxelVolume::empty([4, 4, 4]);
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    assert!(volume.set([x, y, z], if y < 2 { 1 } else { 2 }));
                }
            }
        }
        write_vox_file(path, &volume).expect("writable directory");
    }

    // Tests CLI parsing with only required target file argument
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["voxsynth", "sample.vox"]);

        assert_eq!(cli.target, PathBuf::from("sample.vox"));
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.pattern_size, DEFAULT_PATTERN_SIZE);
        assert_eq!(cli.size, [5, 5, 5]);
        assert_eq!(cli.attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(cli.max_rollbacks, DEFAULT_MAX_ROLLBACKS);
        assert!(cli.skip_existing());
        assert!(cli.should_show_progress());

        let config = cli.solver_config();
        assert!(config.periodic);
        assert!(config.probabilistic);
        assert!(config.augment_neighbours);
        assert!(!config.overlapping);
        assert_eq!(config.rollback_policy, RollbackPolicy::Single);
    }

    // Tests every model flag reaches the solver configuration
    // Verified by mapping --bounded onto the overlapping switch
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "voxsynth",
            "input.vox",
            "-o",
            "out",
            "-n",
            "3",
            "--size",
            "8,4,2",
            "--bounded",
            "--overlapping",
            "--uniform",
            "--no-augment",
            "-s",
            "123",
            "-r",
            "7",
            "--rollback-policy",
            "normal",
            "-a",
            "4",
            "-q",
            "--no-skip",
        ]);

        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.attempts, 4);
        assert!(!cli.skip_existing());
        assert!(!cli.should_show_progress());

        let config = cli.solver_config();
        assert_eq!(config.pattern_size, 3);
        assert_eq!(config.output_size, [8, 4, 2]);
        assert!(!config.periodic);
        assert!(config.overlapping);
        assert!(!config.probabilistic);
        assert!(!config.augment_neighbours);
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_rollbacks, 7);
        assert_eq!(config.rollback_policy, RollbackPolicy::NormalDepth);
    }

    // Tests size parsing accepts both separators and rejects bad input
    // Verified by allowing zero dimensions
    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("5x6x7"), Ok([5, 6, 7]));
        assert_eq!(parse_size("10X2X3"), Ok([10, 2, 3]));
        assert_eq!(parse_size("4, 4, 9"), Ok([4, 4, 9]));
        for text in ["", "5x5", "5x5x5x5", "0x5x5", "ax5x5", "-1x5x5"] {
            assert!(parse_size(text).is_err(), "accepted '{text}'");
        }
        assert!(Cli::try_parse_from(["voxsynth", "a.vox", "--size", "5x5"]).is_err());
    }

    // Tests result naming next to the input or in the output directory
    // Verified by keeping the input stem without the suffix
    #[test]
    fn test_output_path_generation() {
        let cli = Cli::parse_from(["voxsynth", "models/tree.vox"]);
        assert_eq!(
            cli.output_path(Path::new("models/tree.vox")),
            PathBuf::from("models/tree_result.vox")
        );

        let cli = Cli::parse_from(["voxsynth", "models/tree.vox", "-o", "results"]);
        assert_eq!(
            cli.output_path(Path::new("models/tree.vox")),
            PathBuf::from("results/tree_result.vox")
        );
    }

    // Tests directory scans skip results, other files and existing outputs
    // Verified by collecting result files as inputs
    #[test]
    fn test_collect_files_from_directory() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let root = directory.path();
        for name in ["b.vox", "a.VOX", "c.vox", "z_result.vox", "notes.txt"] {
            fs::write(root.join(name), b"").expect("writable directory");
        }
        fs::write(root.join("c_result.vox"), b"").expect("writable directory");

        let target = root.to_string_lossy().to_string();
        let processor = FileProcessor::new(Cli::parse_from(["voxsynth", &target, "-q"]));
        assert_eq!(
            processor.collect_files().expect("readable directory"),
            vec![root.join("a.VOX"), root.join("b.vox")]
        );

        let processor =
            FileProcessor::new(Cli::parse_from(["voxsynth", &target, "-q", "--no-skip"]));
        assert_eq!(
            processor.collect_files().expect("readable directory"),
            vec![root.join("a.VOX"), root.join("b.vox"), root.join("c.vox")]
        );
    }

    // Tests invalid targets are rejected before any processing
    // Verified by accepting files of any extension
    #[test]
    fn test_invalid_targets() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let text_file = directory.path().join("notes.txt");
        fs::write(&text_file, b"text").expect("writable directory");

        for target in [text_file, directory.path().join("missing.vox")] {
            let target = target.to_string_lossy().to_string();
            let mut processor = FileProcessor::new(Cli::parse_from(["voxsynth", &target, "-q"]));
            assert!(matches!(
                processor.process(),
                Err(SynthesisError::InvalidParameter {
                    parameter: "target",
                    ..
                })
            ));
        }
    }

    // Tests a sample file is synthesized into the output directory
    // Verified by writing the result next to the input despite -o
    #[test]
    fn test_process_writes_result() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let input = directory.path().join("layers.vox");
        let output_dir = directory.path().join("out");
        write_layered_sample(&input);

        let target = input.to_string_lossy().to_string();
        let output = output_dir.to_string_lossy().to_string();
        let cli = Cli::parse_from(["voxsynth", &target, "-o", &output, "--size", "3x3x3", "-q"]);
        FileProcessor::new(cli).process().expect("layered sample solves");

        let result = read_vox_file(&output_dir.join("layers_result.vox")).expect("result written");
        assert_eq!(result.size(), [6, 6, 6]);
        assert_eq!(result.voxels().len(), 216);
    }
}
