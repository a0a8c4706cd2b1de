use std::collections::BTreeMap;

use serde::Deserialize;

/// Lifetime class of an allocation. The cache passes it through untouched;
/// what each class means is up to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTag {
    /// Lives until explicitly released.
    Permanent,
    /// Freed when the current level is unloaded.
    Level,
    /// May be reclaimed whenever the allocator needs room.
    #[default]
    Purgeable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHandle(u64);

/// Allocation capability the resource cache is built on.
pub trait Allocator: Send {
    /// Allocates a zeroed block of `size` bytes and returns it for filling.
    fn allocate(&mut self, size: usize, tag: CacheTag) -> (BlockHandle, &mut [u8]);

    /// The block's bytes, or `None` once it has been reclaimed.
    fn block(&self, handle: BlockHandle) -> Option<&[u8]>;

    /// Marks the block as no longer referenced. The allocator decides when
    /// the memory is actually reclaimed.
    fn release(&mut self, handle: BlockHandle);

    /// Reclaims every block of the given lifetime class.
    fn free_tag(&mut self, tag: CacheTag);
}

struct Block {
    data: Vec<u8>,
    tag: CacheTag,
}

/// Heap-backed allocator with an optional byte budget.
///
/// Released blocks become purgeable. When an allocation would exceed the
/// budget, purgeable blocks are reclaimed oldest first; if that is not enough
/// the allocation still succeeds and the zone simply runs over budget.
#[derive(Default)]
pub struct ZoneAllocator {
    blocks: BTreeMap<BlockHandle, Block>,
    next_handle: u64,
    used: usize,
    budget: Option<usize>,
}

impl ZoneAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: usize) -> Self {
        ZoneAllocator {
            budget: Some(budget),
            ..Self::default()
        }
    }

    /// Bytes currently held by live blocks.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn reclaim(&mut self, handle: BlockHandle) {
        if let Some(block) = self.blocks.remove(&handle) {
            self.used -= block.data.len();
        }
    }

    fn make_room(&mut self, size: usize) {
        let Some(budget) = self.budget else {
            return;
        };
        while self.used + size > budget {
            let victim = self
                .blocks
                .iter()
                .find(|(_, block)| block.tag == CacheTag::Purgeable)
                .map(|(&handle, _)| handle);
            match victim {
                Some(handle) => {
                    log::trace!("zone: purging block {:?}", handle);
                    self.reclaim(handle);
                }
                None => {
                    log::warn!(
                        "zone: allocation of {} bytes exceeds budget ({} of {} in use)",
                        size,
                        self.used,
                        budget
                    );
                    break;
                }
            }
        }
    }
}

impl Allocator for ZoneAllocator {
    fn allocate(&mut self, size: usize, tag: CacheTag) -> (BlockHandle, &mut [u8]) {
        self.make_room(size);
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        self.used += size;
        let block = self.blocks.entry(handle).or_insert(Block {
            data: vec![0; size],
            tag,
        });
        (handle, block.data.as_mut_slice())
    }

    fn block(&self, handle: BlockHandle) -> Option<&[u8]> {
        self.blocks.get(&handle).map(|b| b.data.as_slice())
    }

    fn release(&mut self, handle: BlockHandle) {
        match self.budget {
            Some(_) => {
                if let Some(block) = self.blocks.get_mut(&handle) {
                    block.tag = CacheTag::Purgeable;
                }
            }
            // nothing would ever purge it
            None => self.reclaim(handle),
        }
    }

    fn free_tag(&mut self, tag: CacheTag) {
        let doomed: Vec<BlockHandle> = self
            .blocks
            .iter()
            .filter(|(_, b)| b.tag == tag)
            .map(|(&h, _)| h)
            .collect();
        for handle in doomed {
            self.reclaim(handle);
        }
    }
}
