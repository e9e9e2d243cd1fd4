//! Tests for progress tracking and multi-file batch processing

#[cfg(test)]
mod tests {
    use std::path::Path;
    use voxsynth::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
    use voxsynth::io::progress::{FileState, ProgressManager};

    // Tests a file moves through start, update and completion
    // Verified by leaving the collapsed count behind on completion
    #[test]
    fn test_single_file_lifecycle() {
        let mut pm = ProgressManager::new();
        pm.initialize(1);

        pm.start_file(0, Path::new("samples/castle.vox"), 27);
        assert_eq!(
            pm.file_state(0),
            Some(&FileState {
                name: "castle.vox".to_string(),
                collapsed: 0,
                total: 27,
                attempt: 0,
            })
        );

        pm.update_cells(0, 12, 2);
        let state = pm.file_state(0).expect("file was started");
        assert_eq!(state.collapsed, 12);
        assert_eq!(state.attempt, 2);

        pm.complete_file(0);
        let state = pm.file_state(0).expect("file was started");
        assert_eq!(state.collapsed, 27);
        assert!(state.name.ends_with("castle.vox"));
        assert_ne!(state.name, "castle.vox");
        pm.finish();
    }

    // Tests default and new produce equivalent managers
    // Verified by creating different initial states
    #[test]
    fn test_progress_manager_default() {
        let mut pm1 = ProgressManager::new();
        let mut pm2 = ProgressManager::default();

        for pm in [&mut pm1, &mut pm2] {
            pm.initialize(2);
            pm.start_file(1, Path::new("b.vox"), 8);
        }

        assert_eq!(pm1.file_state(1), pm2.file_state(1));
        assert_eq!(pm1.file_state(0), Some(&FileState::default()));
        pm1.finish();
        pm2.finish();
    }

    // Tests updates to unknown files are ignored
    // Verified by growing the state table on update
    #[test]
    fn test_update_unknown_file() {
        let mut pm = ProgressManager::new();
        pm.initialize(1);

        pm.update_cells(3, 5, 1);
        pm.complete_file(3);

        assert!(pm.file_state(3).is_none());
        pm.finish();
    }

    // Tests batches larger than the bar limit keep every file state
    // Verified by truncating state to the visible bars
    #[test]
    fn test_large_batch() {
        let file_count = MAX_INDIVIDUAL_PROGRESS_BARS + 3;
        let mut pm = ProgressManager::new();
        pm.initialize(file_count);

        for index in 0..file_count {
            pm.start_file(index, Path::new(&format!("sample_{index}.vox")), 10);
            pm.update_cells(index, 5, 1);
            pm.complete_file(index);
        }

        for index in 0..file_count {
            let state = pm.file_state(index).expect("file was started");
            assert_eq!(state.collapsed, 10);
        }
        pm.finish();
    }
}
