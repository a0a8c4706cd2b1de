use super::{Allocator, BlockHandle, CacheTag, ResourceId, ZoneAllocator};

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    block: BlockHandle,
    tag: CacheTag,
    size: usize,
}

/// Demand-populated store of decoded resource data, indexed by [`ResourceId`].
///
/// Memory comes from an [`Allocator`], which may reclaim purgeable blocks at
/// any time. An entry whose block is gone reads as not cached.
pub struct ResourceCache {
    entries: Vec<Option<CacheEntry>>,
    allocator: Box<dyn Allocator>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(0, Box::new(ZoneAllocator::new()))
    }
}

impl ResourceCache {
    pub fn new(count: usize, allocator: Box<dyn Allocator>) -> Self {
        ResourceCache {
            entries: vec![None; count],
            allocator,
        }
    }

    /// Releases every entry and resizes the table for `count` resources.
    pub fn reset(&mut self, count: usize) {
        for index in 0..self.entries.len() {
            self.release_data(ResourceId::from_index(index));
        }
        self.entries = vec![None; count];
    }

    /// Adds empty slots so that ids below `count` can be cached. Existing
    /// entries are kept.
    pub fn grow(&mut self, count: usize) {
        if count > self.entries.len() {
            self.entries.resize(count, None);
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// The cached bytes for `id`, if any.
    pub fn get_data(&self, id: ResourceId) -> Option<&[u8]> {
        let entry = self.entries.get(id.index())?.as_ref()?;
        self.allocator.block(entry.block)
    }

    pub fn is_cached(&self, id: ResourceId) -> bool {
        self.get_data(id).is_some()
    }

    /// Allocates `size` bytes for `id` and returns the buffer for the caller to fill.
    pub fn cache_data(&mut self, id: ResourceId, size: usize, tag: CacheTag) -> &mut [u8] {
        let index = id.index();
        debug_assert!(index < self.entries.len(), "resource id {} out of range", id);

        if let Some(stale) = self.entries[index].take() {
            debug_assert!(
                self.allocator.block(stale.block).is_none(),
                "resource {} cached twice",
                id
            );
            self.allocator.release(stale.block);
        }

        let (block, data) = self.allocator.allocate(size, tag);
        self.entries[index] = Some(CacheEntry { block, tag, size });
        data
    }

    /// Drops the mapping for `id` and hands the memory back to the allocator.
    /// Does nothing if `id` is not cached.
    pub fn release_data(&mut self, id: ResourceId) {
        if let Some(entry) = self.entries.get_mut(id.index()).and_then(Option::take) {
            log::trace!(
                "releasing {} ({} bytes, {:?})",
                id,
                entry.size,
                entry.tag
            );
            self.allocator.release(entry.block);
        }
    }

    /// Number of ids whose data is currently resident.
    pub fn cached_count(&self) -> usize {
        (0..self.entries.len())
            .filter(|&i| self.is_cached(ResourceId::from_index(i)))
            .count()
    }

    /// Lets the allocator reclaim every block of a lifetime class.
    pub fn free_tag(&mut self, tag: CacheTag) {
        self.allocator.free_tag(tag);
    }
}
