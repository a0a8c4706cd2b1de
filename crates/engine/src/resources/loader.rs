use super::{
    Container, NameTranslator, ResourceContainer, ResourceError, ResourceId, ResourcePath,
    ResourceRecord,
};

/// Decoding strategy that replaces a container's byte-for-byte extraction for
/// one resource.
pub trait ResourceLoader: Send + Sync {
    /// Size of the decoded payload, which may differ from the raw entry size.
    fn size(&self) -> u32;

    /// Writes exactly `size()` bytes into `dest`.
    ///
    /// `raw` reads the undecoded bytes of other resources. It never goes
    /// through the cache or another loader, so a loader cannot recurse into
    /// itself.
    fn load(&self, raw: &RawResourceAccessor<'_>, dest: &mut [u8]) -> Result<(), ResourceError>;
}

/// Read-only view of the open resource set for containers and loaders that
/// derive their data from other resources.
#[derive(Clone, Copy)]
pub struct RawResourceAccessor<'a> {
    containers: &'a [Container],
    records: &'a [ResourceRecord],
    translator: &'a NameTranslator,
}

impl<'a> RawResourceAccessor<'a> {
    pub(crate) fn new(
        containers: &'a [Container],
        records: &'a [ResourceRecord],
        translator: &'a NameTranslator,
    ) -> Self {
        RawResourceAccessor {
            containers,
            records,
            translator,
        }
    }

    pub fn resolve(&self, path: &ResourcePath) -> ResourceId {
        self.translator.resolve(path)
    }

    fn record(&self, id: ResourceId) -> Result<&'a ResourceRecord, ResourceError> {
        self.records
            .get(id.index())
            .ok_or(ResourceError::InvalidId(id))
    }

    fn container(&self, record: &ResourceRecord) -> &'a Container {
        &self.containers[record.container_id.index()]
    }

    /// Raw size of the container entry behind `id`.
    pub fn resource_size(&self, id: ResourceId) -> Result<u32, ResourceError> {
        let record = self.record(id)?;
        Ok(self.container(record).entry_size(record.entry))
    }

    /// Copies the raw container bytes of `id` into `dest`, whose length must
    /// equal [`resource_size`](Self::resource_size).
    pub fn load_resource(&self, id: ResourceId, dest: &mut [u8]) -> Result<(), ResourceError> {
        let record = self.record(id)?;
        self.container(record).load_entry(dest, record.entry)
    }

    pub fn read_resource(&self, id: ResourceId) -> Result<Vec<u8>, ResourceError> {
        let mut data = vec![0; self.resource_size(id)? as usize];
        self.load_resource(id, &mut data)?;
        Ok(data)
    }
}
