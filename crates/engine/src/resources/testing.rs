//! Helpers for building resource files on disk in tests.

use std::path::{Path, PathBuf};

pub struct WadBuilder {
    identification: &'static [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn pwad() -> Self {
        WadBuilder {
            identification: b"PWAD",
            lumps: Vec::new(),
        }
    }

    pub fn iwad() -> Self {
        WadBuilder {
            identification: b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(mut self, name: &str, data: &[u8]) -> Self {
        self.lumps.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let data_length: usize = self.lumps.iter().map(|(_, d)| d.len()).sum();
        let directory_offset = 12 + data_length;

        let mut out = Vec::new();
        out.extend_from_slice(self.identification);
        out.extend_from_slice(&(self.lumps.len() as i32).to_le_bytes());
        out.extend_from_slice(&(directory_offset as i32).to_le_bytes());

        let mut offsets = Vec::new();
        for (_, data) in &self.lumps {
            offsets.push(out.len());
            out.extend_from_slice(data);
        }
        for ((name, data), offset) in self.lumps.iter().zip(offsets) {
            out.extend_from_slice(&(offset as i32).to_le_bytes());
            out.extend_from_slice(&(data.len() as i32).to_le_bytes());
            let mut raw_name = [0u8; 8];
            for (dst, src) in raw_name.iter_mut().zip(name.bytes()) {
                *dst = src;
            }
            out.extend_from_slice(&raw_name);
        }
        out
    }

    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// A patch picture of `width` x `height` where every column is one opaque post
/// filled with `color`.
pub fn solid_patch(width: u16, height: u8, color: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&(height as u16).to_le_bytes());
    out.extend_from_slice(&0i16.to_le_bytes());
    out.extend_from_slice(&0i16.to_le_bytes());

    let columns_start = 8 + 4 * width as usize;
    let column_length = 4 + height as usize + 1;
    for x in 0..width as usize {
        out.extend_from_slice(&((columns_start + x * column_length) as u32).to_le_bytes());
    }
    for _ in 0..width {
        out.push(0); // top delta
        out.push(height);
        out.push(0); // padding
        out.extend(std::iter::repeat_n(color, height as usize));
        out.push(0); // padding
        out.push(0xFF);
    }
    out
}

pub fn pnames(names: &[&str]) -> Vec<u8> {
    let mut out = (names.len() as i32).to_le_bytes().to_vec();
    for name in names {
        let mut raw = [0u8; 8];
        for (dst, src) in raw.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        out.extend_from_slice(&raw);
    }
    out
}

/// One texture definition: name, size and `(origin_x, origin_y, patch)` list.
pub struct TextureDef<'a> {
    pub name: &'a str,
    pub width: i16,
    pub height: i16,
    pub patches: &'a [(i16, i16, i16)],
}

pub fn texture_lump(defs: &[TextureDef]) -> Vec<u8> {
    let mut bodies = Vec::new();
    for def in defs {
        let mut body = Vec::new();
        let mut raw = [0u8; 8];
        for (dst, src) in raw.iter_mut().zip(def.name.bytes()) {
            *dst = src;
        }
        body.extend_from_slice(&raw);
        body.extend_from_slice(&0i32.to_le_bytes()); // masked
        body.extend_from_slice(&def.width.to_le_bytes());
        body.extend_from_slice(&def.height.to_le_bytes());
        body.extend_from_slice(&0i32.to_le_bytes()); // column directory
        body.extend_from_slice(&(def.patches.len() as i16).to_le_bytes());
        for &(x, y, patch) in def.patches {
            body.extend_from_slice(&x.to_le_bytes());
            body.extend_from_slice(&y.to_le_bytes());
            body.extend_from_slice(&patch.to_le_bytes());
            body.extend_from_slice(&1i16.to_le_bytes()); // step dir
            body.extend_from_slice(&0i16.to_le_bytes()); // colormap
        }
        bodies.push(body);
    }

    let mut out = (defs.len() as i32).to_le_bytes().to_vec();
    let mut offset = 4 + 4 * defs.len();
    for body in &bodies {
        out.extend_from_slice(&(offset as i32).to_le_bytes());
        offset += body.len();
    }
    for body in bodies {
        out.extend_from_slice(&body);
    }
    out
}
