use indexmap::IndexMap;

use super::{ResourceContainerId, ResourceId, ResourcePath};

/// Maps resource paths to every resource registered under them.
///
/// Ids are kept in registration order, which is container order and then entry
/// order within a container. The last id for a path wins a lookup: the most
/// recently opened container overrides older ones, and within a container the
/// last declared entry wins.
#[derive(Debug, Default)]
pub struct NameTranslator {
    translations: IndexMap<ResourcePath, Vec<(ResourceId, ResourceContainerId)>>,
}

impl NameTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the list of resources sharing `path`.
    pub fn add_translation(
        &mut self,
        path: &ResourcePath,
        id: ResourceId,
        container_id: ResourceContainerId,
    ) {
        self.translations
            .entry(path.clone())
            .or_default()
            .push((id, container_id));
    }

    /// The highest-priority id registered for `path`, or [`ResourceId::INVALID`].
    pub fn resolve(&self, path: &ResourcePath) -> ResourceId {
        self.translations
            .get(path)
            .and_then(|ids| ids.last())
            .map(|&(id, _)| id)
            .unwrap_or(ResourceId::INVALID)
    }

    /// Like [`resolve`](Self::resolve) but only considers ids that came from
    /// `container_id`.
    pub fn resolve_in_container(
        &self,
        path: &ResourcePath,
        container_id: ResourceContainerId,
    ) -> ResourceId {
        self.translations
            .get(path)
            .and_then(|ids| ids.iter().rev().find(|&&(_, c)| c == container_id))
            .map(|&(id, _)| id)
            .unwrap_or(ResourceId::INVALID)
    }

    /// Every id registered for `path`, lowest priority first.
    pub fn resolve_all(&self, path: &ResourcePath) -> Vec<ResourceId> {
        self.translations
            .get(path)
            .map(|ids| ids.iter().map(|&(id, _)| id).collect())
            .unwrap_or_default()
    }

    /// Distinct paths strictly below `base`, in first-registration order.
    pub fn list_under(&self, base: &ResourcePath) -> Vec<ResourcePath> {
        self.translations
            .keys()
            .filter(|path| path.len() > base.len() && path.starts_with_base(base))
            .cloned()
            .collect()
    }

    /// True if `id` is the id a lookup of `path` currently returns.
    pub fn is_visible(&self, path: &ResourcePath, id: ResourceId) -> bool {
        id.is_valid() && self.resolve(path) == id
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    pub fn clear(&mut self) {
        self.translations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ResourceId {
        ResourceId::from_index(n)
    }

    fn cid(n: usize) -> ResourceContainerId {
        ResourceContainerId::from_index(n)
    }

    #[test]
    fn last_registration_wins() {
        let door = ResourcePath::parse("/textures/door");
        let mut translator = NameTranslator::new();
        // container 0 declares door twice, container 1 once
        translator.add_translation(&door, id(0), cid(0));
        translator.add_translation(&door, id(1), cid(0));
        assert_eq!(translator.resolve(&door), id(1));

        translator.add_translation(&door, id(5), cid(1));
        assert_eq!(translator.resolve(&door), id(5));
        assert_eq!(translator.resolve_all(&door), vec![id(0), id(1), id(5)]);

        assert!(translator.is_visible(&door, id(5)));
        assert!(!translator.is_visible(&door, id(1)));
    }

    #[test]
    fn container_restricted_lookup() {
        let things = ResourcePath::parse("/maps/e1m1/things");
        let mut translator = NameTranslator::new();
        translator.add_translation(&things, id(2), cid(0));
        translator.add_translation(&things, id(9), cid(1));

        assert_eq!(translator.resolve_in_container(&things, cid(0)), id(2));
        assert_eq!(translator.resolve_in_container(&things, cid(1)), id(9));
        assert_eq!(
            translator.resolve_in_container(&things, cid(2)),
            ResourceId::INVALID
        );
    }

    #[test]
    fn unknown_path_is_not_found() {
        let translator = NameTranslator::new();
        assert_eq!(
            translator.resolve(&ResourcePath::parse("/global/nothing")),
            ResourceId::INVALID
        );
        assert!(!translator.is_visible(&ResourcePath::parse("/global/nothing"), ResourceId::INVALID));
    }

    #[test]
    fn listing_is_deduplicated_by_path() {
        let mut translator = NameTranslator::new();
        translator.add_translation(&ResourcePath::parse("/textures/door"), id(0), cid(0));
        translator.add_translation(&ResourcePath::parse("/textures/wall"), id(1), cid(0));
        translator.add_translation(&ResourcePath::parse("/flats/floor"), id(2), cid(0));
        translator.add_translation(&ResourcePath::parse("/textures/door"), id(3), cid(1));
        translator.add_translation(&ResourcePath::parse("/textures"), id(4), cid(1));

        let listed = translator.list_under(&ResourcePath::parse("/textures"));
        assert_eq!(
            listed,
            vec![
                ResourcePath::parse("/textures/door"),
                ResourcePath::parse("/textures/wall"),
            ]
        );
    }
}
