//! Gestion des ressources du jeu : WAD, fichiers isolés, répertoires et textures composites.
//!
//! Objectif principal :
//! - Ouvrir plusieurs sources dans l'ordre donné ; une source ouverte plus tard remplace
//!   les ressources de même chemin des sources précédentes.
//! - Attribuer à chaque ressource un `ResourceId` stable tant que l'ensemble reste ouvert.
//! - Charger les données à la demande et les garder en cache (`ResourceCache`).
//!
//! Design :
//! - `ResourceContainer` est le trait commun à toutes les sources ; `Container` est
//!   l'ensemble fermé des variantes (WAD, fichier, répertoire, textures).
//! - `NameTranslator` résout un `ResourcePath` vers l'id le plus prioritaire.
//! - `ResourceLoader` remplace l'extraction brute quand une ressource est dérivée
//!   d'autres ressources (ex: `CompositeTextureLoader`).
//! - `ResourceManager` orchestre le tout et expose l'API publique.

mod cache;
mod container;
mod error;
mod fs;
mod ids;
mod loader;
mod manager;
mod path;
mod translator;
mod wad;
mod zone;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::*;
pub use container::*;
pub use error::*;
pub use fs::*;
pub use ids::*;
pub use loader::*;
pub use manager::*;
pub use path::*;
pub use translator::*;
pub use wad::{WadLump, is_wad_identification, lump_name, read_directory};
pub use zone::*;
