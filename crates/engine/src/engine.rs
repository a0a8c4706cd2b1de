use std::path::PathBuf;

use crate::{CacheTag, ResourceConfig, ResourceError, ResourceId, ResourceManager, ZoneAllocator};

/// Engine: structure principale du moteur, propriétaire du `ResourceManager`.
///
/// Les sous-systèmes qui ont besoin de ressources reçoivent une référence vers
/// `engine.resources` ; il n'y a pas d'instance globale.
pub struct Engine {
    pub config: ResourceConfig,
    pub resources: ResourceManager,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ResourceConfig::default())
    }
}

impl Engine {
    pub fn new(config: ResourceConfig) -> Self {
        let allocator = match config.zone_budget {
            Some(budget) => ZoneAllocator::with_budget(budget),
            None => ZoneAllocator::new(),
        };
        let mut resources = ResourceManager::new(Box::new(allocator));
        resources.set_max_name_length(config.max_name_length);
        Engine { config, resources }
    }

    /// Opens the configured sources.
    pub fn init(&mut self) {
        log::info!("Starting engine...");
        self.resources.open_sources(self.config.sources.as_slice());
        log::info!("Engine initialization complete.");
    }

    /// Swaps the open resource set for `sources`. Every `ResourceId` handed out
    /// before is invalid afterwards.
    pub fn reload(&mut self, sources: Vec<PathBuf>) {
        log::info!("Reloading resources ({} sources)", sources.len());
        self.config.sources = sources;
        self.resources.open_sources(self.config.sources.as_slice());
    }

    /// Loads with the configured default tag.
    pub fn load(&mut self, id: ResourceId) -> Result<&[u8], ResourceError> {
        self.resources.load(id, self.config.default_tag)
    }

    /// Frees level-scoped data, e.g. when the current map is unloaded.
    pub fn end_level(&mut self) {
        self.resources.purge(CacheTag::Level);
    }

    pub fn shutdown(&mut self) {
        self.resources.close_all();
        log::info!("Engine shut down.");
    }
}
