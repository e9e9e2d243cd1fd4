//! Tests for `.vox` decoding and encoding

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use voxsynth::SynthesisError;
    use voxsynth::io::vox::{decode_vox, encode_vox, read_vox_file, write_vox_file};
    use voxsynth::spatial::volume::{Voxel, VoxelVolume};

    fn chunk(id: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let mut bytes = id.to_vec();
        bytes.extend_from_slice(&(content.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(children.len() as u32).to_le_bytes());
        bytes.extend_from_slice(content);
        bytes.extend_from_slice(children);
        bytes
    }

    fn words(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_le_bytes()).collect()
    }

    fn document(children: &[u8]) -> Vec<u8> {
        let mut bytes = b"VOX ".to_vec();
        bytes.extend_from_slice(&150_u32.to_le_bytes());
        bytes.extend(chunk(b"MAIN", &[], children));
        bytes
    }

    // Tests the file's z-up axes are swapped into y-up
    // Verified by reading SIZE in file order
    #[test]
    fn test_decode_swaps_axes() {
        let mut children = chunk(b"SIZE", &words(&[2, 3, 4]), &[]);
        let mut xyzi = words(&[2]);
        xyzi.extend_from_slice(&[1, 2, 3, 9, 0, 0, 0, 4]);
        children.extend(chunk(b"XYZI", &xyzi, &[]));

        let sample = decode_vox(&document(&children)).expect("valid document");

        assert_eq!(sample.size(), [2, 4, 3]);
        assert_eq!(
            sample.voxels(),
            &[Voxel::new(1, 3, 2, 9), Voxel::new(0, 0, 0, 4)]
        );
    }

    // Tests unknown chunks and extra models are skipped
    // Verified by failing on unrecognised chunk IDs
    #[test]
    fn test_decode_skips_unknown_chunks() {
        let mut children = chunk(b"PACK", &words(&[1]), &[]);
        children.extend(chunk(b"SIZE", &words(&[1, 1, 1]), &[]));
        let mut xyzi = words(&[1]);
        xyzi.extend_from_slice(&[0, 0, 0, 5]);
        children.extend(chunk(b"XYZI", &xyzi, &[]));
        children.extend(chunk(b"SIZE", &words(&[9, 9, 9]), &[]));
        children.extend(chunk(b"RGBA", &[0; 1024], &[]));

        let sample = decode_vox(&document(&children)).expect("valid document");

        assert_eq!(sample.size(), [1, 1, 1]);
        assert_eq!(sample.voxels(), &[Voxel::new(0, 0, 0, 5)]);
    }

    // Tests malformed documents are rejected with a format error
    // Verified by ignoring voxels outside the declared size
    #[test]
    fn test_decode_errors() {
        let cases = [
            b"NOPE\x96\0\0\0".to_vec(),
            b"VOX ".to_vec(),
            document(&[]),
            document(&chunk(b"XYZI", &words(&[0]), &[])),
            {
                let mut children = chunk(b"SIZE", &words(&[1, 1, 1]), &[]);
                let mut xyzi = words(&[1]);
                xyzi.extend_from_slice(&[1, 0, 0, 5]);
                children.extend(chunk(b"XYZI", &xyzi, &[]));
                document(&children)
            },
            {
                let mut children = chunk(b"SIZE", &words(&[1, 1, 1]), &[]);
                children.extend(chunk(b"XYZI", &words(&[3]), &[]));
                document(&children)
            },
        ];

        for bytes in cases {
            assert!(matches!(
                decode_vox(&bytes),
                Err(SynthesisError::VoxFormat { .. })
            ));
        }
    }

    // Tests the encoded layout and chunk sizes
    // Verified by omitting the SIZE chunk header from the MAIN child size
    #[test]
    fn test_encode_layout() {
        let mut volume = VoxelVolume::empty([2, 3, 4]);
        assert!(volume.set([1, 2, 3], 7));
        assert!(volume.set([0, 0, 0], 1));

        let bytes = encode_vox(&volume).expect("small volume");

        assert_eq!(bytes.get(0..4), Some(&b"VOX "[..]));
        assert_eq!(bytes.get(4..8), Some(&150_u32.to_le_bytes()[..]));
        assert_eq!(bytes.get(8..12), Some(&b"MAIN"[..]));
        assert_eq!(bytes.get(16..20), Some(&(40_u32 + 4 * 2).to_le_bytes()[..]));
        assert_eq!(bytes.get(32..44), Some(&words(&[2, 4, 3])[..]));
        assert_eq!(bytes.len(), 20 + 40 + 8);
    }

    // Tests a volume survives encoding and decoding
    // Verified by writing voxels in y-up order
    #[test]
    fn test_encode_decode_preserves_volume() {
        let colors: Vec<u8> = (0..24).map(|index| (index % 5) as u8).collect();
        let volume = VoxelVolume::from_array(
            Array3::from_shape_vec((2, 3, 4), colors).expect("shape matches"),
        );

        let bytes = encode_vox(&volume).expect("small volume");
        let decoded = decode_vox(&bytes)
            .expect("encoded data is valid")
            .to_volume()
            .expect("voxels are in bounds");

        assert_eq!(decoded, volume);
    }

    // Tests oversized volumes cannot be encoded
    // Verified by truncating coordinates to u8
    #[test]
    fn test_encode_rejects_large_volume() {
        let volume = VoxelVolume::empty([257, 1, 1]);
        assert!(matches!(
            encode_vox(&volume),
            Err(SynthesisError::VoxFormat { .. })
        ));
    }

    // Tests file helpers write and read back, and report missing files
    // Verified by dropping the path from read errors
    #[test]
    fn test_file_round_trip() {
        let directory = tempfile::tempdir().expect("temporary directory");
        let path = directory.path().join("model.vox");
        let mut volume = VoxelVolume::empty([3, 3, 3]);
        assert!(volume.set([2, 1, 0], 4));

        write_vox_file(&path, &volume).expect("writable directory");
        let sample = read_vox_file(&path).expect("file was written");
        assert_eq!(sample.voxels(), &[Voxel::new(2, 1, 0, 4)]);

        let missing = directory.path().join("missing.vox");
        match read_vox_file(&missing) {
            Err(SynthesisError::FileSystem { path, operation, .. }) => {
                assert_eq!(path, missing);
                assert_eq!(operation, "read");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
