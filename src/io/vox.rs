//! MagicaVoxel `.vox` reading and writing
//!
//! Only the first model's `SIZE` and `XYZI` chunks are interpreted; every other
//! chunk is skipped by its declared content size. MagicaVoxel is z-up while the
//! solver is y-up, so the second and third axes are swapped on the way in and
//! swapped back on the way out.

use std::fs;
use std::path::Path;

use crate::io::configuration::{MAX_VOX_DIMENSION, VOX_VERSION};
use crate::io::error::{Result, WithPath, vox_format};
use crate::spatial::volume::{Voxel, VoxelSample, VoxelVolume};

const MAGIC: &[u8; 4] = b"VOX ";
const CHUNK_HEADER_BYTES: usize = 12;
const SIZE_CONTENT_BYTES: usize = 12;

/// Little-endian cursor over a byte slice
struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.position.saturating_add(count);
        let slice = self.bytes.get(self.position..end).ok_or_else(|| {
            vox_format(&format!(
                "unexpected end of data at byte {} (wanted {count} more)",
                self.position
            ))
        })?;
        self.position = end;
        Ok(slice)
    }

    fn tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0; 4];
        tag.copy_from_slice(self.take(4)?);
        Ok(tag)
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.tag()?))
    }

    fn length(&mut self) -> Result<usize> {
        let value = self.u32()?;
        usize::try_from(value).map_err(|_| vox_format(&format!("length {value} does not fit")))
    }
}

/// Decode a `.vox` byte stream into a sample
///
/// # Errors
///
/// Returns an error if:
/// - The header is not `VOX `
/// - The data ends inside a chunk
/// - No `SIZE` chunk precedes the voxels
/// - A voxel lies outside the declared size
pub fn decode_vox(bytes: &[u8]) -> Result<VoxelSample> {
    let mut reader = ByteReader::new(bytes);
    if &reader.tag()? != MAGIC {
        return Err(vox_format(&"missing 'VOX ' header"));
    }
    let _version = reader.u32()?;

    let mut size: Option<[usize; 3]> = None;
    let mut voxels: Option<Vec<Voxel>> = None;

    while !reader.is_empty() {
        let id = reader.tag()?;
        let content_bytes = reader.length()?;
        // Children follow as ordinary chunks
        let _children_bytes = reader.length()?;

        match &id {
            b"SIZE" if size.is_none() => {
                let x = reader.length()?;
                let z = reader.length()?;
                let y = reader.length()?;
                let _ = reader.take(content_bytes.saturating_sub(SIZE_CONTENT_BYTES))?;
                size = Some([x, y, z]);
            }
            b"XYZI" if voxels.is_none() => {
                let bounds = size.ok_or_else(|| vox_format(&"XYZI chunk before SIZE chunk"))?;
                let count = reader.length()?;
                let mut parsed = Vec::with_capacity(count.min(bytes.len() / 4));
                for _ in 0..count {
                    let &[x, z, y, color] = reader.take(4)? else {
                        return Err(vox_format(&"truncated voxel record"));
                    };
                    if [x, y, z]
                        .iter()
                        .zip(bounds)
                        .any(|(&component, extent)| usize::from(component) >= extent)
                    {
                        return Err(vox_format(&format!(
                            "voxel ({x}, {y}, {z}) lies outside model size {bounds:?}"
                        )));
                    }
                    parsed.push(Voxel::new(x, y, z, color));
                }
                let consumed = 4 + 4 * count;
                let _ = reader.take(content_bytes.saturating_sub(consumed))?;
                voxels = Some(parsed);
            }
            _ => {
                let _ = reader.take(content_bytes)?;
            }
        }
    }

    let size = size.ok_or_else(|| vox_format(&"no SIZE chunk"))?;
    Ok(VoxelSample::new(size, voxels.unwrap_or_default()))
}

/// Read and decode a `.vox` file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid `.vox` data
pub fn read_vox_file(path: &Path) -> Result<VoxelSample> {
    let bytes = fs::read(path).with_path(path, "read")?;
    decode_vox(&bytes)
}

/// Encode a volume as a single-model `.vox` byte stream
///
/// Empty voxels are omitted.
///
/// # Errors
///
/// Returns an error if any dimension exceeds what `.vox` can address
pub fn encode_vox(volume: &VoxelVolume) -> Result<Vec<u8>> {
    let size = volume.size();
    if size.iter().any(|&extent| extent > MAX_VOX_DIMENSION) {
        return Err(vox_format(&format!(
            "volume {size:?} exceeds the {MAX_VOX_DIMENSION} voxel limit per axis"
        )));
    }
    let voxels = volume.to_voxels();
    let [x, y, z] = size.map(|extent| extent as u32);
    let voxel_count = voxels.len() as u32;

    let size_chunk = (CHUNK_HEADER_BYTES + SIZE_CONTENT_BYTES) as u32;
    let xyzi_content = 4 + 4 * voxel_count;
    let children = size_chunk + CHUNK_HEADER_BYTES as u32 + xyzi_content;

    let mut bytes = Vec::with_capacity(20 + children as usize);
    bytes.extend_from_slice(MAGIC);
    push_u32(&mut bytes, VOX_VERSION);

    bytes.extend_from_slice(b"MAIN");
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, children);

    bytes.extend_from_slice(b"SIZE");
    push_u32(&mut bytes, SIZE_CONTENT_BYTES as u32);
    push_u32(&mut bytes, 0);
    for extent in [x, z, y] {
        push_u32(&mut bytes, extent);
    }

    bytes.extend_from_slice(b"XYZI");
    push_u32(&mut bytes, xyzi_content);
    push_u32(&mut bytes, 0);
    push_u32(&mut bytes, voxel_count);
    for voxel in &voxels {
        bytes.extend_from_slice(&[voxel.x, voxel.z, voxel.y, voxel.color]);
    }

    Ok(bytes)
}

/// Encode a volume and write it to disk
///
/// # Errors
///
/// Returns an error if the volume is too large or the file cannot be written
pub fn write_vox_file(path: &Path, volume: &VoxelVolume) -> Result<()> {
    let bytes = encode_vox(volume)?;
    fs::write(path, bytes).with_path(path, "write")
}

fn push_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}
