use std::path::{Path, PathBuf};

use super::{ResourceContainer, check_entry};
use crate::resources::{GLOBAL_DIRECTORY_NAME, ResourceError, ResourcePath, fs};

/// A loose file exposed as one entry named after the file's stem.
pub struct SingleLumpContainer {
    file: PathBuf,
    path: ResourcePath,
    size: u32,
}

impl SingleLumpContainer {
    pub fn open(file: &Path) -> Result<Self, ResourceError> {
        let size = fs::file_length(file)?;
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(SingleLumpContainer {
            file: file.to_path_buf(),
            path: ResourcePath::root().join(GLOBAL_DIRECTORY_NAME).join(&stem),
            size: u32::try_from(size)
                .map_err(|_| ResourceError::malformed(file.display().to_string(), "file too large"))?,
        })
    }
}

impl ResourceContainer for SingleLumpContainer {
    fn entry_count(&self) -> usize {
        1
    }

    fn entry_path(&self, entry: usize) -> &ResourcePath {
        debug_assert_eq!(entry, 0);
        &self.path
    }

    fn entry_size(&self, _entry: usize) -> u32 {
        self.size
    }

    fn load_entry(&self, dest: &mut [u8], entry: usize) -> Result<(), ResourceError> {
        check_entry(self, dest, entry)?;
        fs::read_range(&self.file, 0, dest)
    }
}
