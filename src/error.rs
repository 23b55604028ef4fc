use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("cannot open classpath root {root}: {source}")]
    Io {
        root: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read archive {root}: {source}")]
    Archive {
        root: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("walk of {root} failed: {source}")]
    Walk {
        root: String,
        #[source]
        source: ignore::Error,
    },
    #[error("resource not found on classpath: {0}")]
    ResourceNotFound(String),
    #[error("descriptor {0} has no -H:Class token")]
    DescriptorParseMiss(String),
    #[error("unit {name} could not be resolved: {reason}")]
    NameResolution { name: String, reason: String },
}

impl DiscoveryError {
    /// Storage failures abort the whole scan; everything else is a per-item skip.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Archive { .. } | Self::Walk { .. })
    }

    pub(crate) fn unresolved(name: &str, reason: impl Into<String>) -> Self {
        Self::NameResolution {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DiscoveryError> = std::result::Result<T, E>;
