use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ResourceContainer, check_entry};
use crate::resources::{GLOBAL_DIRECTORY_NAME, ResourceError, ResourcePath, fs};

struct DirectoryEntry {
    path: ResourcePath,
    file: PathBuf,
    size: u32,
}

/// Every file below a directory, one entry each.
///
/// `textures/door.png` becomes `/TEXTURES/DOOR`; files directly in the root go
/// to `/GLOBAL`. Hidden files and directories are skipped. Entries are
/// enumerated in file-name order.
pub struct DirectoryContainer {
    entries: Vec<DirectoryEntry>,
}

impl DirectoryContainer {
    pub fn open(root: &Path) -> Result<Self, ResourceError> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    log::warn!("{}: {}", root.display(), err);
                    continue;
                }
            };
            if !item.file_type().is_file() {
                continue;
            }
            let Ok(relative) = item.path().strip_prefix(root) else {
                continue;
            };
            let size = match item.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    log::warn!("{}: {}", item.path().display(), err);
                    continue;
                }
            };
            let Ok(size) = u32::try_from(size) else {
                log::warn!("{}: too large, skipping", item.path().display());
                continue;
            };
            entries.push(DirectoryEntry {
                path: resource_path_for(relative),
                file: item.path().to_path_buf(),
                size,
            });
        }

        Ok(DirectoryContainer { entries })
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn resource_path_for(relative: &Path) -> ResourcePath {
    let mut path = ResourcePath::root();
    let parent = relative.parent().filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(parent) => {
            for component in parent.components() {
                path = path.join(&component.as_os_str().to_string_lossy());
            }
        }
        None => path = path.join(GLOBAL_DIRECTORY_NAME),
    }
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.join(&stem)
}

impl ResourceContainer for DirectoryContainer {
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
        fs::read_range(&self.entries[entry].file, 0, dest)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn enumerates_recursively_with_relative_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("textures/walls")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("textures/door.png"), b"door").unwrap();
        std::fs::write(root.join("textures/walls/brick.raw"), b"brick").unwrap();
        std::fs::write(root.join("playpal.lmp"), b"pal").unwrap();
        std::fs::write(root.join(".git/config"), b"ignored").unwrap();

        let container = DirectoryContainer::open(root).unwrap();
        let paths: Vec<String> = (0..container.entry_count())
            .map(|i| container.entry_path(i).to_string())
            .collect();
        assert_eq!(
            paths,
            [
                "/GLOBAL/PLAYPAL",
                "/TEXTURES/DOOR",
                "/TEXTURES/WALLS/BRICK"
            ]
        );

        let mut buf = vec![0; container.entry_size(2) as usize];
        container.load_entry(&mut buf, 2).unwrap();
        assert_eq!(buf, b"brick");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("colormap.lmp"), b"map").unwrap();
        std::os::unix::fs::symlink(root.join("gone.lmp"), root.join("dangling.lmp")).unwrap();

        let container = DirectoryContainer::open(root).unwrap();
        assert_eq!(container.entry_count(), 1);
        assert_eq!(container.entry_path(0).to_string(), "/GLOBAL/COLORMAP");
    }

    #[test]
    fn empty_directory_has_no_entries() {
        let dir = tempdir().unwrap();
        let container = DirectoryContainer::open(dir.path()).unwrap();
        assert_eq!(container.entry_count(), 0);
    }
}
