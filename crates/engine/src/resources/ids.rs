use std::fmt;

/// Opaque handle to a registered resource.
///
/// It is the index of the resource's record in the manager's append-only
/// record table and stays valid until every container is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Sentinel returned when a lookup finds nothing.
    pub const INVALID: ResourceId = ResourceId(u32::MAX);

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        ResourceId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<ResourceId> for u32 {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Sequential handle assigned to a container when it is registered.
/// A higher id means the container was opened later and wins overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceContainerId(u32);

impl ResourceContainerId {
    pub(crate) fn from_index(index: usize) -> Self {
        ResourceContainerId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ResourceContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
