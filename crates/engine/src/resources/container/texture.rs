use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use super::ResourceContainer;
use crate::resources::{
    GLOBAL_DIRECTORY_NAME, PATCHES_DIRECTORY_NAME, RawResourceAccessor, ResourceError, ResourceId,
    ResourceLoader, ResourcePath, TEXTURES_DIRECTORY_NAME, wad,
};

const TEXTURE_LUMP_NAMES: &[&str] = &["TEXTURE1", "TEXTURE2"];

/// Size of the `[width][height]` header in front of composite pixel data.
const COMPOSITE_HEADER_SIZE: usize = 4;

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RawTextureDef {
    name: [u8; 8],
    _masked: i32,
    width: i16,
    height: i16,
    _column_directory: i32,
    patch_count: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RawTexturePatch {
    origin_x: i16,
    origin_y: i16,
    patch: i16,
    _step_dir: i16,
    _colormap: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RawPatchHeader {
    width: i16,
    _height: i16,
    _left_offset: i16,
    _top_offset: i16,
}

#[derive(Debug, Clone, Copy)]
struct TexturePatch {
    origin_x: i32,
    origin_y: i32,
    id: ResourceId,
}

/// Builds a composite texture out of patch pictures.
///
/// Output layout: width and height as little-endian `u16`, then `width * height`
/// palette indices row by row, then a `width * height` mask holding 1 wherever
/// a patch drew a pixel.
pub struct CompositeTextureLoader {
    name: String,
    width: u16,
    height: u16,
    patches: Vec<TexturePatch>,
}

impl CompositeTextureLoader {
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn draw_patch(
        &self,
        patch: &TexturePatch,
        data: &[u8],
        pixels: &mut [u8],
        mask: &mut [u8],
    ) -> Result<(), ResourceError> {
        let bad = |reason: &str| ResourceError::Loader {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        let header_size = std::mem::size_of::<RawPatchHeader>();
        if data.len() < header_size {
            return Err(bad("patch shorter than its header"));
        }
        let header: RawPatchHeader = bytemuck::pod_read_unaligned(&data[..header_size]);
        let patch_width = i16::from_le(header.width).max(0) as usize;
        let offsets_end = header_size + 4 * patch_width;
        if data.len() < offsets_end {
            return Err(bad("patch column table truncated"));
        }

        let (width, height) = (self.width as i32, self.height as i32);
        for column in 0..patch_width {
            let x = patch.origin_x + column as i32;
            if x < 0 || x >= width {
                continue;
            }
            let at = header_size + 4 * column;
            let mut pos = u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
                as usize;

            loop {
                let Some(&top_delta) = data.get(pos) else {
                    return Err(bad("column runs past end of patch"));
                };
                if top_delta == 0xFF {
                    break;
                }
                let length = *data.get(pos + 1).ok_or_else(|| bad("truncated post"))? as usize;
                let source = data
                    .get(pos + 3..pos + 3 + length)
                    .ok_or_else(|| bad("truncated post"))?;
                for (row, &value) in source.iter().enumerate() {
                    let y = patch.origin_y + top_delta as i32 + row as i32;
                    if (0..height).contains(&y) {
                        let index = y as usize * self.width as usize + x as usize;
                        pixels[index] = value;
                        mask[index] = 1;
                    }
                }
                pos += length + 4;
            }
        }
        Ok(())
    }
}

impl ResourceLoader for CompositeTextureLoader {
    fn size(&self) -> u32 {
        (COMPOSITE_HEADER_SIZE + 2 * self.pixel_count()) as u32
    }

    fn load(&self, raw: &RawResourceAccessor<'_>, dest: &mut [u8]) -> Result<(), ResourceError> {
        if dest.len() != self.size() as usize {
            return Err(ResourceError::Loader {
                name: self.name.clone(),
                reason: format!("expected a {} byte buffer, got {}", self.size(), dest.len()),
            });
        }
        dest.fill(0);
        dest[0..2].copy_from_slice(&self.width.to_le_bytes());
        dest[2..4].copy_from_slice(&self.height.to_le_bytes());
        let (pixels, mask) = dest[COMPOSITE_HEADER_SIZE..].split_at_mut(self.pixel_count());

        for patch in &self.patches {
            if !patch.id.is_valid() {
                continue;
            }
            let data = raw.read_resource(patch.id)?;
            self.draw_patch(patch, &data, pixels, mask)?;
        }
        Ok(())
    }
}

struct TextureEntry {
    path: ResourcePath,
    loader: Arc<CompositeTextureLoader>,
}

/// Synthetic container holding one composite texture per `TEXTURE1` /
/// `TEXTURE2` definition. It has no bytes of its own: every entry is produced
/// by its [`CompositeTextureLoader`].
#[derive(Default)]
pub struct TextureContainer {
    entries: Vec<TextureEntry>,
}

impl TextureContainer {
    /// Reads `PNAMES` and the texture lumps of the currently open resources.
    /// A malformed lump is logged and contributes nothing.
    pub fn build(raw: &RawResourceAccessor<'_>) -> Self {
        let global = ResourcePath::root().join(GLOBAL_DIRECTORY_NAME);
        let pnames_id = raw.resolve(&global.join("PNAMES"));
        if !pnames_id.is_valid() {
            return Self::default();
        }

        let patch_ids = match raw
            .read_resource(pnames_id)
            .and_then(|data| parse_pnames(&data))
        {
            Ok(names) => names
                .iter()
                .map(|name| resolve_patch(raw, name))
                .collect::<Vec<_>>(),
            Err(err) => {
                log::warn!("ignoring PNAMES: {}", err);
                return Self::default();
            }
        };

        let textures = ResourcePath::root().join(TEXTURES_DIRECTORY_NAME);
        let mut entries = Vec::new();
        for lump in TEXTURE_LUMP_NAMES {
            let id = raw.resolve(&global.join(lump));
            if !id.is_valid() {
                continue;
            }
            let parsed = raw
                .read_resource(id)
                .and_then(|data| parse_texture_lump(lump, &data, &patch_ids));
            match parsed {
                Ok(loaders) => entries.extend(loaders.into_iter().map(|loader| TextureEntry {
                    path: textures.join(&loader.name),
                    loader: Arc::new(loader),
                })),
                Err(err) => log::warn!("ignoring {}: {}", lump, err),
            }
        }
        TextureContainer { entries }
    }
}

fn resolve_patch(raw: &RawResourceAccessor<'_>, name: &str) -> ResourceId {
    let root = ResourcePath::root();
    let id = raw.resolve(&root.join(PATCHES_DIRECTORY_NAME).join(name));
    if id.is_valid() {
        return id;
    }
    raw.resolve(&root.join(GLOBAL_DIRECTORY_NAME).join(name))
}

fn read_i32(data: &[u8], at: usize) -> Option<i32> {
    let bytes = data.get(at..at + 4)?;
    Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn parse_pnames(data: &[u8]) -> Result<Vec<String>, ResourceError> {
    let count = read_i32(data, 0)
        .filter(|&c| c >= 0)
        .ok_or_else(|| ResourceError::malformed("PNAMES", "missing count"))? as usize;
    let names = count
        .checked_mul(8)
        .and_then(|n| data.get(4..4 + n))
        .ok_or_else(|| ResourceError::malformed("PNAMES", "name table truncated"))?;
    Ok(names.chunks_exact(8).map(wad::lump_name).collect())
}

fn parse_texture_lump(
    lump: &str,
    data: &[u8],
    patch_ids: &[ResourceId],
) -> Result<Vec<CompositeTextureLoader>, ResourceError> {
    let malformed = |reason: &str| ResourceError::malformed(lump, reason);
    let count = read_i32(data, 0)
        .filter(|&c| c >= 0)
        .ok_or_else(|| malformed("missing texture count"))? as usize;
    let table_end = count.checked_mul(4).and_then(|n| n.checked_add(4));
    if table_end.is_none_or(|end| end > data.len()) {
        return Err(malformed("texture count exceeds lump size"));
    }

    let def_size = std::mem::size_of::<RawTextureDef>();
    let patch_size = std::mem::size_of::<RawTexturePatch>();
    let mut loaders = Vec::with_capacity(count);

    for i in 0..count {
        let offset = read_i32(data, 4 + 4 * i)
            .filter(|&o| o >= 0)
            .ok_or_else(|| malformed("offset table truncated"))? as usize;
        let raw_def = data
            .get(offset..offset + def_size)
            .ok_or_else(|| malformed("texture definition out of bounds"))?;
        let def: RawTextureDef = bytemuck::pod_read_unaligned(raw_def);

        let name = wad::lump_name(&def.name);
        let width = i16::from_le(def.width);
        let height = i16::from_le(def.height);
        let patch_count = i16::from_le(def.patch_count).max(0) as usize;
        if width <= 0 || height <= 0 {
            log::warn!("{}: texture {} has no area, skipping", lump, name);
            continue;
        }

        let patches_start = offset + def_size;
        let raw_patches = data
            .get(patches_start..patches_start + patch_count * patch_size)
            .ok_or_else(|| malformed("patch list out of bounds"))?;

        let mut patches = Vec::with_capacity(patch_count);
        for raw_patch in raw_patches.chunks_exact(patch_size) {
            let p: RawTexturePatch = bytemuck::pod_read_unaligned(raw_patch);
            let index = i16::from_le(p.patch);
            let id = usize::try_from(index)
                .ok()
                .and_then(|i| patch_ids.get(i).copied())
                .unwrap_or(ResourceId::INVALID);
            if !id.is_valid() {
                log::warn!("{}: texture {} uses missing patch {}", lump, name, index);
            }
            patches.push(TexturePatch {
                origin_x: i16::from_le(p.origin_x) as i32,
                origin_y: i16::from_le(p.origin_y) as i32,
                id,
            });
        }

        loaders.push(CompositeTextureLoader {
            name,
            width: width as u16,
            height: height as u16,
            patches,
        });
    }
    Ok(loaders)
}

impl ResourceContainer for TextureContainer {
    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn entry_path(&self, entry: usize) -> &ResourcePath {
        &self.entries[entry].path
    }

    fn entry_size(&self, _entry: usize) -> u32 {
        0
    }

    fn load_entry(&self, _dest: &mut [u8], entry: usize) -> Result<(), ResourceError> {
        Err(ResourceError::NoDefaultLoader(entry))
    }

    fn entry_loader(&self, entry: usize) -> Option<Arc<dyn ResourceLoader>> {
        let loader: Arc<dyn ResourceLoader> = self.entries[entry].loader.clone();
        Some(loader)
    }
}
