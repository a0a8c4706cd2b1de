use std::path::{Path, PathBuf};

use super::{ResourceContainer, check_entry};
use crate::resources::{
    COLORMAPS_DIRECTORY_NAME, FLATS_DIRECTORY_NAME, GLOBAL_DIRECTORY_NAME, MAPS_DIRECTORY_NAME,
    PATCHES_DIRECTORY_NAME, ResourceError, ResourcePath, SPRITES_DIRECTORY_NAME, fs, wad,
};

/// Lumps that may follow a map marker.
const MAP_LUMP_NAMES: &[&str] = &[
    "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
    "REJECT", "BLOCKMAP", "BEHAVIOR", "SCRIPTS", "TEXTMAP", "ZNODES", "DIALOGUE", "ENDMAP",
];

/// Namespace delimiters: `<prefix>_START` / `<prefix>_END`.
const NAMESPACE_MARKERS: &[(&str, &str)] = &[
    ("F", FLATS_DIRECTORY_NAME),
    ("FF", FLATS_DIRECTORY_NAME),
    ("S", SPRITES_DIRECTORY_NAME),
    ("SS", SPRITES_DIRECTORY_NAME),
    ("P", PATCHES_DIRECTORY_NAME),
    ("PP", PATCHES_DIRECTORY_NAME),
    ("C", COLORMAPS_DIRECTORY_NAME),
];

/// Sub-markers (`F1_START`, `P2_END`, ...) that appear inside a namespace
/// and carry no meaning of their own.
fn is_sub_marker(name: &str) -> bool {
    let prefix = name
        .strip_suffix("_START")
        .or_else(|| name.strip_suffix("_END"));
    matches!(prefix, Some(p) if p.len() == 2 && p.as_bytes()[1].is_ascii_digit())
}

enum Marker {
    Start(&'static str),
    End,
}

fn namespace_marker(name: &str) -> Option<Marker> {
    if let Some(prefix) = name.strip_suffix("_START") {
        return NAMESPACE_MARKERS
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|&(_, dir)| Marker::Start(dir));
    }
    let prefix = name.strip_suffix("_END")?;
    NAMESPACE_MARKERS
        .iter()
        .any(|(p, _)| *p == prefix)
        .then_some(Marker::End)
}

struct WadEntry {
    path: ResourcePath,
    offset: u32,
    size: u32,
}

/// Lumps of one WAD file, placed into namespaces.
///
/// Lumps between namespace delimiters go to that namespace's directory. A
/// lump directly followed by `THINGS` or `TEXTMAP` is a map marker: it is
/// registered as `/MAPS/<MAP>` and the map lumps after it as
/// `/MAPS/<MAP>/<LUMP>`. Everything else lands in `/GLOBAL`.
pub struct WadContainer {
    file: PathBuf,
    entries: Vec<WadEntry>,
}

impl WadContainer {
    pub fn open(file: &Path) -> Result<Self, ResourceError> {
        let lumps = wad::read_directory(file)?;
        Ok(WadContainer {
            file: file.to_path_buf(),
            entries: assign_paths(&lumps),
        })
    }
}

fn assign_paths(lumps: &[wad::WadLump]) -> Vec<WadEntry> {
    let root = ResourcePath::root();
    let mut entries = Vec::with_capacity(lumps.len());
    let mut namespace: Option<&'static str> = None;
    let mut map: Option<ResourcePath> = None;

    for (index, lump) in lumps.iter().enumerate() {
        let name = lump.name.as_str();

        match namespace_marker(name) {
            Some(Marker::Start(dir)) => {
                namespace = Some(dir);
                map = None;
                continue;
            }
            Some(Marker::End) => {
                namespace = None;
                continue;
            }
            None if namespace.is_some() && is_sub_marker(name) => continue,
            None => {}
        }

        if let Some(map_dir) = &map {
            if MAP_LUMP_NAMES.contains(&name) {
                entries.push(WadEntry {
                    path: map_dir.join(name),
                    offset: lump.offset,
                    size: lump.size,
                });
                if name == "ENDMAP" {
                    map = None;
                }
                continue;
            }
            map = None;
        }

        let next = lumps.get(index + 1).map(|l| l.name.as_str());
        let path = if matches!(next, Some("THINGS" | "TEXTMAP")) {
            let map_dir = root.join(MAPS_DIRECTORY_NAME).join(name);
            map = Some(map_dir.clone());
            map_dir
        } else {
            root.join(namespace.unwrap_or(GLOBAL_DIRECTORY_NAME)).join(name)
        };

        entries.push(WadEntry {
            path,
            offset: lump.offset,
            size: lump.size,
        });
    }
    entries
}

impl ResourceContainer for WadContainer {
    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn entry_path(&self, entry: usize) -> &ResourcePath {
        &self.entries[entry].path
    }

    fn entry_size(&self, entry: usize) -> u32 {
        self.entries[entry].size
    }

    fn load_entry(&self, dest: &mut [u8], entry: usize) -> Result<(), ResourceError> {
        check_entry(self, dest, entry)?;
        if dest.is_empty() {
            return Ok(());
        }
        fs::read_range(&self.file, self.entries[entry].offset as u64, dest)
    }
}
