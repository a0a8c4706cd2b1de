use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;

use super::{
    Allocator, CacheTag, Container, DirectoryContainer, LEGACY_NAME_LENGTH, MAPS_DIRECTORY_NAME,
    NameTranslator, RawResourceAccessor, ResourceCache, ResourceContainer, ResourceContainerId,
    ResourceError, ResourceId, ResourceLoader, ResourcePath, SingleLumpContainer, SourceKind,
    TextureContainer, WadContainer, ZoneAllocator, fs,
};

/// Per-resource metadata recorded when a container is opened.
pub struct ResourceRecord {
    pub(crate) path: ResourcePath,
    pub(crate) container_id: ResourceContainerId,
    pub(crate) entry: usize,
    pub(crate) loader: Option<Arc<dyn ResourceLoader>>,
}

/// Cache counters, mostly for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Owns the open resource set: containers, records, the name translator and
/// the cache.
///
/// Sources are opened in priority order, lowest first. A path declared by
/// several sources resolves to the one opened last. The whole set is closed at
/// once with [`close_all`](Self::close_all); ids are invalid afterwards.
pub struct ResourceManager {
    containers: Vec<Container>,
    file_names: Vec<PathBuf>,
    file_hashes: Vec<String>,
    records: Vec<ResourceRecord>,
    translator: NameTranslator,
    cache: ResourceCache,
    stats: CacheStats,
    max_name_length: usize,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(Box::new(ZoneAllocator::new()))
    }
}

impl ResourceManager {
    pub fn new(allocator: Box<dyn Allocator>) -> Self {
        ResourceManager {
            containers: Vec::new(),
            file_names: Vec::new(),
            file_hashes: Vec::new(),
            records: Vec::new(),
            translator: NameTranslator::new(),
            cache: ResourceCache::new(0, allocator),
            stats: CacheStats::default(),
            max_name_length: LEGACY_NAME_LENGTH,
        }
    }

    /// Leaf names longer than this are reported when resolved.
    pub fn set_max_name_length(&mut self, length: usize) {
        self.max_name_length = length;
    }

    /// Opens one source and registers its entries. Sources that cannot be
    /// read or contain nothing are skipped and yield `None`.
    pub fn open_source(&mut self, path: impl AsRef<Path>) -> Option<ResourceContainerId> {
        let path = path.as_ref();
        let opened = match fs::classify_source(path) {
            Some(SourceKind::Wad) => WadContainer::open(path).map(Container::Wad),
            Some(SourceKind::SingleLump) => {
                SingleLumpContainer::open(path).map(Container::SingleLump)
            }
            Some(SourceKind::Directory) => DirectoryContainer::open(path).map(Container::Directory),
            None => {
                log::warn!("skipping {}: not a file or directory", path.display());
                return None;
            }
        };

        let container = match opened {
            Ok(container) => container,
            Err(err) => {
                log::warn!("skipping {}: {}", path.display(), err);
                return None;
            }
        };

        match container.entry_count() {
            0 => {
                log::warn!("skipping {}: no resources", path.display());
                return None;
            }
            1 if fs::is_dehacked_file(path) => {
                log::info!("adding {} (DeHackEd patch)", path.display())
            }
            1 => log::info!("adding {} (single lump)", path.display()),
            n => log::info!("adding {} ({} lumps)", path.display(), n),
        }

        self.file_names.push(path.to_path_buf());
        Some(self.register_container(container))
    }

    /// Opens `paths` in order, then appends the composite texture container.
    /// Any previously open set is closed first.
    pub fn open_sources<P: AsRef<Path>>(&mut self, paths: &[P]) {
        if !self.containers.is_empty() {
            self.close_all();
        }
        for path in paths {
            self.open_source(path);
        }

        let raw = RawResourceAccessor::new(&self.containers, &self.records, &self.translator);
        let textures = TextureContainer::build(&raw);
        log::debug!("{} composite textures", textures.entry_count());
        self.register_container(Container::Texture(textures));

        log::info!(
            "{} resources in {} files",
            self.records.len(),
            self.file_names.len()
        );
    }

    fn register_container(&mut self, container: Container) -> ResourceContainerId {
        let container_id = ResourceContainerId::from_index(self.containers.len());
        for entry in 0..container.entry_count() {
            let path = container.entry_path(entry).clone();
            let loader = container.entry_loader(entry);
            self.add_resource(path, container_id, entry, loader);
        }
        self.containers.push(container);
        container_id
    }

    fn add_resource(
        &mut self,
        path: ResourcePath,
        container_id: ResourceContainerId,
        entry: usize,
        loader: Option<Arc<dyn ResourceLoader>>,
    ) -> ResourceId {
        let id = ResourceId::from_index(self.records.len());
        self.translator.add_translation(&path, id, container_id);
        self.records.push(ResourceRecord {
            path,
            container_id,
            entry,
            loader,
        });
        self.cache.grow(self.records.len());
        id
    }

    /// Releases all cached data and forgets every container and resource.
    pub fn close_all(&mut self) {
        self.cache.reset(0);
        self.records.clear();
        self.containers.clear();
        self.file_names.clear();
        self.file_hashes.clear();
        self.translator.clear();
        self.stats = CacheStats::default();
    }

    pub fn is_open(&self) -> bool {
        !self.containers.is_empty()
    }

    pub fn resource_count(&self) -> usize {
        self.records.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn validate(&self, id: ResourceId) -> bool {
        id.index() < self.records.len()
    }

    fn record(&self, id: ResourceId) -> Result<&ResourceRecord, ResourceError> {
        self.records.get(id.index()).ok_or(ResourceError::InvalidId(id))
    }

    /// Id of the highest-priority resource at `path`, or [`ResourceId::INVALID`].
    pub fn resolve(&self, path: &ResourcePath) -> ResourceId {
        if path.exceeds_name_length(self.max_name_length) {
            log::warn!(
                "searching for resource with name longer than {} chars: {}",
                self.max_name_length,
                path.last()
            );
        }
        self.translator.resolve(path)
    }

    pub fn resolve_name(&self, name: &str, directory: &ResourcePath) -> ResourceId {
        self.resolve(&directory.join(name))
    }

    /// Every id registered at `path`, lowest priority first.
    pub fn resolve_all(&self, path: &ResourcePath) -> Vec<ResourceId> {
        self.translator.resolve_all(path)
    }

    /// Resolves `anchor/name`, considering only entries from the container that
    /// provides the winning entry of `anchor`. Returns
    /// [`ResourceId::INVALID`] when the anchor is unknown or its container has
    /// no such entry, even if another container does.
    pub fn resolve_in_container_of(&self, name: &str, anchor: &ResourcePath) -> ResourceId {
        match self.container_id(self.translator.resolve(anchor)) {
            Some(container_id) => self
                .translator
                .resolve_in_container(&anchor.join(name), container_id),
            None => ResourceId::INVALID,
        }
    }

    fn map_path(map_name: &str) -> ResourcePath {
        ResourcePath::root().join(MAPS_DIRECTORY_NAME).join(map_name)
    }

    /// True if a map marker named `map_name` exists.
    pub fn check_map(&self, map_name: &str) -> bool {
        let maps = ResourcePath::root().join(MAPS_DIRECTORY_NAME);
        self.validate(self.resolve_name(map_name, &maps))
    }

    /// A lump of `map_name`, taken from the same source as the map's marker.
    pub fn map_resource_id(&self, lump_name: &str, map_name: &str) -> ResourceId {
        self.resolve_in_container_of(lump_name, &Self::map_path(map_name))
    }

    /// Distinct resource paths below `directory`.
    pub fn list_directory(&self, directory: &ResourcePath) -> Vec<ResourcePath> {
        self.translator.list_under(directory)
    }

    pub fn all_resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        (0..self.records.len()).map(ResourceId::from_index)
    }

    pub fn path(&self, id: ResourceId) -> Option<&ResourcePath> {
        self.records.get(id.index()).map(|r| &r.path)
    }

    /// Leaf name of `id`, or `""` if it is not valid.
    pub fn name(&self, id: ResourceId) -> &str {
        self.path(id).map(ResourcePath::last).unwrap_or("")
    }

    pub fn container_id(&self, id: ResourceId) -> Option<ResourceContainerId> {
        self.records.get(id.index()).map(|r| r.container_id)
    }

    /// Kind of source `id` was read from (`"wad"`, `"file"`, ...).
    pub fn container_kind(&self, id: ResourceId) -> Option<&'static str> {
        let container_id = self.container_id(id)?;
        self.containers.get(container_id.index()).map(Container::kind)
    }

    /// File the resource came from. Synthetic resources have none.
    pub fn container_file_name(&self, id: ResourceId) -> Option<&Path> {
        let record = self.records.get(id.index())?;
        self.file_names
            .get(record.container_id.index())
            .map(PathBuf::as_path)
    }

    /// Paths of the opened source files, in priority order.
    pub fn file_names(&self) -> &[PathBuf] {
        &self.file_names
    }

    /// MD5 of every opened source file, computed on first request.
    pub fn file_hashes(&mut self) -> Result<&[String]> {
        if self.file_hashes.len() != self.file_names.len() {
            self.file_hashes = self
                .file_names
                .iter()
                .map(|file| fs::file_hash(file))
                .collect::<Result<_>>()?;
        }
        Ok(&self.file_hashes)
    }

    /// Size of the data `load` would produce. Never loads anything.
    pub fn size(&self, id: ResourceId) -> Result<u32, ResourceError> {
        let record = self.record(id)?;
        Ok(match &record.loader {
            Some(loader) => loader.size(),
            None => self.containers[record.container_id.index()].entry_size(record.entry),
        })
    }

    /// Returns the data of `id`, reading it on the first request and serving
    /// it from the cache afterwards.
    ///
    /// A failure while reading means the resource set is broken; callers are
    /// expected to treat it as fatal.
    pub fn load(&mut self, id: ResourceId, tag: CacheTag) -> Result<&[u8], ResourceError> {
        if !self.validate(id) {
            return Err(ResourceError::InvalidId(id));
        }

        if self.cache.is_cached(id) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            if let Err(err) = self.extract(id, tag) {
                self.cache.release_data(id);
                log::error!("failed to load {}: {}", self.records[id.index()].path, err);
                return Err(err);
            }
        }

        self.cache.get_data(id).ok_or(ResourceError::InvalidId(id))
    }

    fn extract(&mut self, id: ResourceId, tag: CacheTag) -> Result<(), ResourceError> {
        let record = &self.records[id.index()];
        log::debug!("resource cache miss for {}", record.path);

        let container = &self.containers[record.container_id.index()];
        match &record.loader {
            Some(loader) => {
                let raw = RawResourceAccessor::new(&self.containers, &self.records, &self.translator);
                let dest = self.cache.cache_data(id, loader.size() as usize, tag);
                loader.load(&raw, dest)
            }
            None => {
                let size = container.entry_size(record.entry);
                let dest = self.cache.cache_data(id, size as usize, tag);
                container.load_entry(dest, record.entry)
            }
        }
    }

    /// Drops the cached data of `id`. Harmless for invalid or uncached ids.
    pub fn release(&mut self, id: ResourceId) {
        if self.validate(id) {
            self.cache.release_data(id);
        }
    }

    pub fn is_cached(&self, id: ResourceId) -> bool {
        self.cache.is_cached(id)
    }

    /// Lets the allocator reclaim everything loaded with `tag`.
    pub fn purge(&mut self, tag: CacheTag) {
        self.cache.free_tag(tag);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Raw view of the open set, for code that must read other resources'
    /// bytes without going through the cache.
    pub fn raw_accessor(&self) -> RawResourceAccessor<'_> {
        RawResourceAccessor::new(&self.containers, &self.records, &self.translator)
    }

    /// Writes one line per resource: id, a marker (`$` cached, `*` visible,
    /// `-` overridden), path, size and source file.
    pub fn dump(&self, out: &mut impl Write) -> std::io::Result<()> {
        for id in self.all_resource_ids() {
            let record = &self.records[id.index()];
            let mark = if self.cache.is_cached(id) {
                '$'
            } else if self.translator.is_visible(&record.path, id) {
                '*'
            } else {
                '-'
            };
            writeln!(
                out,
                "{} {} {} [{}] [{}]",
                id,
                mark,
                record.path,
                self.size(id).unwrap_or(0),
                self.container_file_name(id)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )?;
        }
        Ok(())
    }
}
