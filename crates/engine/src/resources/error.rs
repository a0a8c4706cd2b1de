use std::path::PathBuf;

use thiserror::Error;

use super::ResourceId;

/// Errors raised while reading or decoding resource data.
///
/// Unknown paths are not errors: they resolve to [`ResourceId::INVALID`].
/// Anything returned from a load means the resource set is corrupt or a backing
/// file vanished, and the caller should treat it as fatal.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid resource id {0}")]
    InvalidId(ResourceId),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("size mismatch for entry {entry}: expected {expected} bytes, got a {actual} byte buffer")]
    SizeMismatch {
        entry: usize,
        expected: u32,
        actual: usize,
    },

    #[error("entry {0} has no default extraction and needs a loader")]
    NoDefaultLoader(usize),

    #[error("malformed data in {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("loader failed for {name}: {reason}")]
    Loader { name: String, reason: String },
}

impl ResourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ResourceError::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
