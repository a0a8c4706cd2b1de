use std::fmt;

/// Directory for resources that belong to no particular namespace.
pub const GLOBAL_DIRECTORY_NAME: &str = "GLOBAL";
pub const FLATS_DIRECTORY_NAME: &str = "FLATS";
pub const SPRITES_DIRECTORY_NAME: &str = "SPRITES";
pub const PATCHES_DIRECTORY_NAME: &str = "PATCHES";
pub const COLORMAPS_DIRECTORY_NAME: &str = "COLORMAPS";
pub const MAPS_DIRECTORY_NAME: &str = "MAPS";
pub const TEXTURES_DIRECTORY_NAME: &str = "TEXTURES";

/// Legacy limit on the length of a resource's leaf name.
pub const LEGACY_NAME_LENGTH: usize = 8;

/// Hierarchical resource name: namespace/directory segments followed by a leaf.
///
/// Segments are upper-cased on construction so that lookups are case-insensitive.
/// Equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The root path ("/").
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a slash-separated path such as `"/textures/door"`.
    /// Empty segments are ignored.
    pub fn parse(path: &str) -> Self {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(Self::root(), |acc, s| acc.join(s))
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(normalize_segment(segment));
        ResourcePath { segments }
    }

    /// The path without its last segment, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(ResourcePath {
            segments: rest.to_vec(),
        })
    }

    /// The leaf name, or `""` for the root.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if every segment of `base` is a leading segment of `self`.
    pub fn starts_with_base(&self, base: &ResourcePath) -> bool {
        self.segments.starts_with(&base.segments)
    }

    /// True if the leaf exceeds `limit` characters.
    pub fn exceeds_name_length(&self, limit: usize) -> bool {
        self.last().chars().count() > limit
    }
}

fn normalize_segment(segment: &str) -> String {
    segment.trim_matches('/').to_ascii_uppercase()
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        ResourcePath::parse(path)
    }
}
