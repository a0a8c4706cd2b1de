use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{CacheTag, LEGACY_NAME_LENGTH};

fn default_max_name_length() -> usize {
    LEGACY_NAME_LENGTH
}

/// Resource settings, usually read from a TOML file:
///
/// ```toml
/// sources = ["doom2.wad", "mods/brightmaps"]
/// max_name_length = 8
/// default_tag = "purgeable"
/// zone_budget = 33554432
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Sources to open, lowest priority first.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    #[serde(default)]
    pub default_tag: CacheTag,
    /// Byte budget for cached data. Unlimited when absent.
    #[serde(default)]
    pub zone_budget: Option<usize>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            sources: Vec::new(),
            max_name_length: default_max_name_length(),
            default_tag: CacheTag::default(),
            zone_budget: None,
        }
    }
}

impl ResourceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid resource configuration")
    }

    /// Reads a configuration file. Relative source paths are taken relative
    /// to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let mut config =
            Self::from_toml_str(&text).with_context(|| format!("in config {:?}", path))?;
        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.is_relative() {
                    *source = base.join(&*source);
                }
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = ResourceConfig::from_toml_str("sources = [\"doom.wad\"]").unwrap();
        assert_eq!(config.sources, vec![PathBuf::from("doom.wad")]);
        assert_eq!(config.max_name_length, 8);
        assert_eq!(config.default_tag, CacheTag::Purgeable);
        assert_eq!(config.zone_budget, None);
    }

    #[test]
    fn full_config_parses() {
        let config = ResourceConfig::from_toml_str(
            r#"
            sources = ["a.wad", "b"]
            max_name_length = 16
            default_tag = "level"
            zone_budget = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.max_name_length, 16);
        assert_eq!(config.default_tag, CacheTag::Level);
        assert_eq!(config.zone_budget, Some(1024));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ResourceConfig::from_toml_str("sorces = []").is_err());
        assert!(ResourceConfig::from_toml_str("default_tag = \"forever\"").is_err());
    }

    #[test]
    fn sources_are_relative_to_the_config_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("resources.toml");
        std::fs::write(&file, "sources = [\"doom.wad\", \"/abs/mod.wad\"]").unwrap();

        let config = ResourceConfig::load(&file).unwrap();
        assert_eq!(
            config.sources,
            vec![dir.path().join("doom.wad"), PathBuf::from("/abs/mod.wad")]
        );
    }
}
