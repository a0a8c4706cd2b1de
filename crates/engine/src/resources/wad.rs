//! On-disk WAD layout: a 12 byte header followed somewhere by a directory of
//! 16 byte lump entries. All integers are little-endian.

use std::path::Path;

use bytemuck::{Pod, Zeroable};

use super::{ResourceError, fs};

pub const IDENTIFICATION_LENGTH: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawHeader {
    identification: [u8; 4],
    num_lumps: i32,
    directory_offset: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawLumpEntry {
    offset: i32,
    size: i32,
    name: [u8; 8],
}

const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();
const ENTRY_SIZE: usize = std::mem::size_of::<RawLumpEntry>();

/// One entry of a WAD directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadLump {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

pub fn is_wad_identification(data: &[u8]) -> bool {
    data.len() >= IDENTIFICATION_LENGTH
        && matches!(&data[..IDENTIFICATION_LENGTH], b"IWAD" | b"PWAD")
}

/// Decodes a fixed-width, NUL padded lump name.
pub fn lump_name(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&c| c != 0)
        .map(|&c| (c as char).to_ascii_uppercase())
        .collect()
}

/// Reads the directory of the WAD file at `path`.
///
/// Entries pointing past the end of the file are dropped with a warning so a
/// truncated file still exposes whatever it contains.
pub fn read_directory(path: &Path) -> Result<Vec<WadLump>, ResourceError> {
    let file_length = fs::file_length(path)?;
    let display = path.display().to_string();

    let mut header_bytes = [0u8; HEADER_SIZE];
    fs::read_range(path, 0, &mut header_bytes)?;
    let header: RawHeader = bytemuck::pod_read_unaligned(&header_bytes);
    if !is_wad_identification(&header.identification) {
        return Err(ResourceError::malformed(display, "missing IWAD/PWAD identification"));
    }

    let num_lumps = i32::from_le(header.num_lumps);
    let directory_offset = i32::from_le(header.directory_offset);
    if num_lumps < 0 || directory_offset < 0 {
        return Err(ResourceError::malformed(display, "negative directory bounds"));
    }
    let directory_length = num_lumps as u64 * ENTRY_SIZE as u64;
    if directory_offset as u64 + directory_length > file_length {
        return Err(ResourceError::malformed(display, "directory extends past end of file"));
    }

    let mut directory = vec![0u8; directory_length as usize];
    fs::read_range(path, directory_offset as u64, &mut directory)?;

    let mut lumps = Vec::with_capacity(num_lumps as usize);
    for raw in directory.chunks_exact(ENTRY_SIZE) {
        let entry: RawLumpEntry = bytemuck::pod_read_unaligned(raw);
        let offset = i32::from_le(entry.offset);
        let size = i32::from_le(entry.size);
        let name = lump_name(&entry.name);
        if offset < 0 || size < 0 || offset as u64 + size as u64 > file_length {
            log::warn!("{}: lump {} lies outside the file, skipping", display, name);
            continue;
        }
        lumps.push(WadLump {
            name,
            offset: offset as u32,
            size: size as u32,
        });
    }
    Ok(lumps)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::resources::testing::WadBuilder;

    #[test]
    fn reads_directory_in_file_order() {
        let dir = tempdir().unwrap();
        let path = WadBuilder::pwad()
            .lump("PLAYPAL", b"palette")
            .lump("F_START", b"")
            .lump("floor4_8", b"flat")
            .write(dir.path(), "test.wad");

        let lumps = read_directory(&path).unwrap();
        let names: Vec<_> = lumps.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["PLAYPAL", "F_START", "FLOOR4_8"]);
        assert_eq!(lumps[0].size, 7);
        assert_eq!(lumps[1].size, 0);
    }

    #[test]
    fn rejects_bad_identification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wad");
        std::fs::write(&path, b"ZWAD\0\0\0\0\x0c\0\0\0").unwrap();
        assert!(matches!(
            read_directory(&path),
            Err(ResourceError::Malformed { .. })
        ));
    }

    #[test]
    fn lump_names_stop_at_nul() {
        assert_eq!(lump_name(b"e1m1\0\0\0\0"), "E1M1");
        assert_eq!(lump_name(b"TEXTURE1"), "TEXTURE1");
    }
}
