use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use anyhow::{Context, Result};

use super::{ResourceError, wad};

/// Type de source reconnu pour un chemin passé à `open_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Fichier WAD (en-tête "IWAD" ou "PWAD").
    Wad,
    /// N'importe quel autre fichier : une seule ressource opaque.
    SingleLump,
    /// Répertoire parcouru récursivement.
    Directory,
}

/// Classe un chemin du système de fichiers.
/// Retourne `None` si le chemin n'est ni un fichier ni un répertoire.
pub fn classify_source(path: &Path) -> Option<SourceKind> {
    if path.is_file() {
        if is_wad_file(path) {
            Some(SourceKind::Wad)
        } else {
            Some(SourceKind::SingleLump)
        }
    } else if path.is_dir() {
        Some(SourceKind::Directory)
    } else {
        None
    }
}

/// Lit les `length` premiers octets d'un fichier et les passe à `check`.
/// Un fichier trop court ou illisible n'est jamais valide.
fn check_file_prefix(path: &Path, length: usize, check: impl Fn(&[u8]) -> bool) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let mut data = vec![0; length];
    file.read_exact(&mut data).is_ok() && check(&data)
}

/// Vérifie que les quatre premiers octets du fichier sont "IWAD" ou "PWAD".
pub fn is_wad_file(path: &Path) -> bool {
    check_file_prefix(path, wad::IDENTIFICATION_LENGTH, wad::is_wad_identification)
}

const DEHACKED_MAGIC: &[u8] = b"Patch File for DeHackEd v";

/// Assez long pour contenir l'en-tête DeHackEd et un numéro de version.
const DEHACKED_PREFIX_LENGTH: usize = 32;

/// Vrai si `data` commence par l'en-tête d'un patch DeHackEd (casse ignorée).
pub fn is_dehacked_header(data: &[u8]) -> bool {
    data.get(..DEHACKED_MAGIC.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DEHACKED_MAGIC))
}

/// Vérifie que la première ligne du fichier est un en-tête DeHackEd.
pub fn is_dehacked_file(path: &Path) -> bool {
    check_file_prefix(path, DEHACKED_PREFIX_LENGTH, is_dehacked_header)
}

/// Lit exactement `dest.len()` octets à partir de `offset`.
pub fn read_range(path: &Path, offset: u64, dest: &mut [u8]) -> Result<(), ResourceError> {
    let mut file = File::open(path).map_err(|e| ResourceError::io(path, e))?;
    file.seek(SeekFrom::Start(offset))
        .and_then(|_| file.read_exact(dest))
        .map_err(|e| ResourceError::io(path, e))
}

/// Taille d'un fichier sur disque.
pub fn file_length(path: &Path) -> Result<u64, ResourceError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| ResourceError::io(path, e))
}

/// Empreinte MD5 (hexadécimal minuscule) du contenu d'un fichier.
/// Un répertoire n'a pas d'empreinte : on retourne une chaîne vide.
pub fn file_hash(path: &Path) -> Result<String> {
    if path.is_dir() {
        return Ok(String::new());
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {:?} for hashing", path))?;
    let mut context = md5::Context::new();
    std::io::copy(&mut file, &mut context)
        .with_context(|| format!("failed to hash {:?}", path))?;
    Ok(format!("{:x}", context.compute()))
}
