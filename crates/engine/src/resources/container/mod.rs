//! Backing stores that expose named, sized, extractable entries.

mod archive;
mod directory;
mod single_lump;
mod texture;

use std::sync::Arc;

pub use archive::*;
pub use directory::*;
pub use single_lump::*;
pub use texture::*;

use super::{ResourceError, ResourceLoader, ResourcePath};

/// Capabilities every container variant provides. Entries are addressed by
/// their index within the container, in enumeration order.
pub trait ResourceContainer {
    fn entry_count(&self) -> usize;

    fn entry_path(&self, entry: usize) -> &ResourcePath;

    fn entry_size(&self, entry: usize) -> u32;

    /// Copies the entry's bytes into `dest`. Fails if `dest` is not exactly
    /// `entry_size(entry)` bytes long.
    fn load_entry(&self, dest: &mut [u8], entry: usize) -> Result<(), ResourceError>;

    /// Custom loader for an entry, when plain extraction is not enough.
    fn entry_loader(&self, _entry: usize) -> Option<Arc<dyn ResourceLoader>> {
        None
    }
}

/// Closed set of container variants.
pub enum Container {
    Wad(WadContainer),
    SingleLump(SingleLumpContainer),
    Directory(DirectoryContainer),
    Texture(TextureContainer),
}

impl Container {
    fn inner(&self) -> &dyn ResourceContainer {
        match self {
            Container::Wad(c) => c,
            Container::SingleLump(c) => c,
            Container::Directory(c) => c,
            Container::Texture(c) => c,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Container::Wad(_) => "wad",
            Container::SingleLump(_) => "file",
            Container::Directory(_) => "directory",
            Container::Texture(_) => "textures",
        }
    }
}

impl ResourceContainer for Container {
    fn entry_count(&self) -> usize {
        self.inner().entry_count()
    }

    fn entry_path(&self, entry: usize) -> &ResourcePath {
        self.inner().entry_path(entry)
    }

    fn entry_size(&self, entry: usize) -> u32 {
        self.inner().entry_size(entry)
    }

    fn load_entry(&self, dest: &mut [u8], entry: usize) -> Result<(), ResourceError> {
        self.inner().load_entry(dest, entry)
    }

    fn entry_loader(&self, entry: usize) -> Option<Arc<dyn ResourceLoader>> {
        self.inner().entry_loader(entry)
    }
}

fn check_entry(
    container: &dyn ResourceContainer,
    dest: &[u8],
    entry: usize,
) -> Result<(), ResourceError> {
    debug_assert!(entry < container.entry_count(), "entry {} out of range", entry);
    let expected = container.entry_size(entry);
    if dest.len() != expected as usize {
        return Err(ResourceError::SizeMismatch {
            entry,
            expected,
            actual: dest.len(),
        });
    }
    Ok(())
}
